// crates/we_workflow/src/job.rs

//! 任务定义模块
//!
//! 定义模拟任务的标识、状态机与对外摘要。
//!
//! ```text
//! Pending ──> Running <──> Paused
//!                │           │
//!                ├───────────┴──> Stopped
//!                ├──> Completed
//!                └──> Failed
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use we_config::SimulationRequest;

/// 任务ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// 创建新的任务ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// 已创建，驱动线程尚未启动
    Pending,
    /// 运行中
    Running,
    /// 已暂停
    Paused,
    /// 被外部停止，帧已清空
    Stopped,
    /// 到达时间上限
    Completed,
    /// 后台步进出错
    Failed,
}

impl TaskStatus {
    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Completed | Self::Failed)
    }

    /// 是否可以暂停
    pub fn can_pause(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// 是否可以恢复
    pub fn can_resume(&self) -> bool {
        matches!(self, Self::Paused)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        };
        write!(f, "{}", s)
    }
}

/// 帧查询方式
///
/// 外部接口中 `time = -1` 表示最新帧，进入引擎前即转换为 [`FrameQuery::Latest`]。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameQuery {
    /// 最新帧
    Latest,
    /// 最接近给定时刻 [s] 的帧
    Exact(f64),
}

impl FrameQuery {
    /// 由外部时间参数构造
    pub fn from_time_param(time: f64) -> Self {
        if time == -1.0 {
            Self::Latest
        } else {
            Self::Exact(time)
        }
    }
}

/// 模拟任务记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationTask {
    /// 任务ID
    pub id: TaskId,
    /// 任务状态
    pub status: TaskStatus,
    /// 创建任务的请求
    pub request: SimulationRequest,
    /// 网格点数
    pub num_points: usize,
    /// 波成分数
    pub num_components: usize,
    /// 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// 开始时间
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    /// 结束时间
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    /// 错误信息
    pub error: Option<String>,
}

impl SimulationTask {
    /// 创建新任务
    pub fn new(request: SimulationRequest, num_points: usize, num_components: usize) -> Self {
        Self {
            id: TaskId::new(),
            status: TaskStatus::Pending,
            request,
            num_points,
            num_components,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    /// 标记开始
    pub fn mark_started(&mut self) {
        self.status = TaskStatus::Running;
        self.started_at = Some(chrono::Utc::now());
    }

    /// 标记完成
    pub fn mark_completed(&mut self) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(chrono::Utc::now());
    }

    /// 标记失败
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = TaskStatus::Failed;
        self.completed_at = Some(chrono::Utc::now());
        self.error = Some(error.into());
    }

    /// 标记停止
    pub fn mark_stopped(&mut self) {
        self.status = TaskStatus::Stopped;
        self.completed_at = Some(chrono::Utc::now());
    }

    /// 标记暂停
    pub fn mark_paused(&mut self) {
        self.status = TaskStatus::Paused;
    }

    /// 标记恢复
    pub fn mark_resumed(&mut self) {
        self.status = TaskStatus::Running;
    }

    /// 获取运行时长
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.started_at.map(|start| {
            let end = self.completed_at.unwrap_or_else(chrono::Utc::now);
            end - start
        })
    }
}

/// 任务摘要，列表接口只返回这些字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    /// 任务ID
    pub id: TaskId,
    /// 任务状态
    pub status: TaskStatus,
    /// 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// 可查询的帧数（批量任务为采样时刻数）
    pub frame_count: usize,
    /// 最新帧时间
    pub latest_time: Option<f64>,
    /// 错误信息
    pub error: Option<String>,
}

/// 单点查询结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointSample {
    /// 实际使用的查询时刻 [s]
    pub time: f64,
    /// 经度 [度]
    pub lon: f64,
    /// 纬度 [度]
    pub lat: f64,
    /// 波面高度 [m]
    pub wave_height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use we_config::Region;

    #[test]
    fn test_task_id() {
        let id1 = TaskId::new();
        let id2 = TaskId::new();
        assert_ne!(id1, id2);

        let id_str = id1.to_string();
        let id_parsed: TaskId = id_str.parse().unwrap();
        assert_eq!(id1, id_parsed);
        assert!("not-a-uuid".parse::<TaskId>().is_err());
    }

    #[test]
    fn test_task_status() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Stopped.is_terminal());
        assert!(!TaskStatus::Paused.is_terminal());

        assert!(TaskStatus::Running.can_pause());
        assert!(!TaskStatus::Paused.can_pause());
        assert!(TaskStatus::Paused.can_resume());
        assert!(!TaskStatus::Completed.can_resume());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&TaskStatus::Running).unwrap();
        assert_eq!(json, "\"running\"");
        let status: TaskStatus = serde_json::from_str("\"stopped\"").unwrap();
        assert_eq!(status, TaskStatus::Stopped);
    }

    #[test]
    fn test_frame_query_sentinel() {
        assert_eq!(FrameQuery::from_time_param(-1.0), FrameQuery::Latest);
        assert_eq!(FrameQuery::from_time_param(0.6), FrameQuery::Exact(0.6));
        assert_eq!(FrameQuery::from_time_param(-0.5), FrameQuery::Exact(-0.5));
    }

    #[test]
    fn test_task_lifecycle() {
        let request = SimulationRequest::new(Region::new(120.0, 30.0, 120.5, 30.5));
        let mut task = SimulationTask::new(request, 121, 300);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.elapsed().is_none());

        task.mark_started();
        assert_eq!(task.status, TaskStatus::Running);
        assert!(task.started_at.is_some());

        task.mark_paused();
        assert!(task.status.can_resume());
        task.mark_resumed();
        assert_eq!(task.status, TaskStatus::Running);

        task.mark_failed("boom");
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.error.as_deref(), Some("boom"));
        assert!(task.completed_at.is_some());
    }
}

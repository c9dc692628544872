// crates/we_workflow/src/events.rs

//! 事件系统模块
//!
//! 任务生命周期事件的定义和分发。事件在释放任务锁之后发出，
//! 监听器内可以安全地回调管理器的查询接口。

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info, trace, warn};

use crate::job::TaskId;

/// 工作流事件
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    /// 任务已创建（t=0 帧已写入）
    TaskCreated {
        /// 任务ID
        task_id: TaskId,
        /// 网格点数
        num_points: usize,
        /// 波成分数
        num_components: usize,
    },
    /// 驱动线程已启动
    TaskStarted {
        /// 任务ID
        task_id: TaskId,
    },
    /// 新帧已写入缓存
    FrameAppended {
        /// 任务ID
        task_id: TaskId,
        /// 帧时间
        time: f64,
        /// 本次淘汰的帧数
        evicted: usize,
    },
    /// 实时节拍落后
    PacingLagged {
        /// 任务ID
        task_id: TaskId,
        /// 本步计算耗时 [s]
        compute_secs: f64,
        /// 时间步长 [s]
        dt: f64,
    },
    /// 任务已暂停
    TaskPaused {
        /// 任务ID
        task_id: TaskId,
    },
    /// 任务已恢复
    TaskResumed {
        /// 任务ID
        task_id: TaskId,
    },
    /// 任务已停止
    TaskStopped {
        /// 任务ID
        task_id: TaskId,
    },
    /// 任务已完成
    TaskCompleted {
        /// 任务ID
        task_id: TaskId,
        /// 帧数
        frames: usize,
        /// 运行时长 (秒)
        duration_secs: f64,
    },
    /// 任务失败
    TaskFailed {
        /// 任务ID
        task_id: TaskId,
        /// 错误信息
        error: String,
    },
    /// 任务已从注册表移除
    TaskRemoved {
        /// 任务ID
        task_id: TaskId,
    },
}

impl WorkflowEvent {
    /// 获取事件对应的任务ID
    pub fn task_id(&self) -> TaskId {
        match self {
            Self::TaskCreated { task_id, .. } => *task_id,
            Self::TaskStarted { task_id } => *task_id,
            Self::FrameAppended { task_id, .. } => *task_id,
            Self::PacingLagged { task_id, .. } => *task_id,
            Self::TaskPaused { task_id } => *task_id,
            Self::TaskResumed { task_id } => *task_id,
            Self::TaskStopped { task_id } => *task_id,
            Self::TaskCompleted { task_id, .. } => *task_id,
            Self::TaskFailed { task_id, .. } => *task_id,
            Self::TaskRemoved { task_id } => *task_id,
        }
    }

    /// 获取事件名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::TaskCreated { .. } => "TaskCreated",
            Self::TaskStarted { .. } => "TaskStarted",
            Self::FrameAppended { .. } => "FrameAppended",
            Self::PacingLagged { .. } => "PacingLagged",
            Self::TaskPaused { .. } => "TaskPaused",
            Self::TaskResumed { .. } => "TaskResumed",
            Self::TaskStopped { .. } => "TaskStopped",
            Self::TaskCompleted { .. } => "TaskCompleted",
            Self::TaskFailed { .. } => "TaskFailed",
            Self::TaskRemoved { .. } => "TaskRemoved",
        }
    }
}

/// 事件监听器
pub trait EventListener: Send + Sync {
    /// 处理事件
    fn on_event(&self, event: &WorkflowEvent);

    /// 监听器名称
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// 闭包监听器
pub struct FnListener<F> {
    name: String,
    handler: F,
}

impl<F> FnListener<F>
where
    F: Fn(&WorkflowEvent) + Send + Sync,
{
    /// 包装闭包
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> EventListener for FnListener<F>
where
    F: Fn(&WorkflowEvent) + Send + Sync,
{
    fn on_event(&self, event: &WorkflowEvent) {
        (self.handler)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 把事件写入 tracing
///
/// 节拍滞后记为 `warn`，失败记为 `error`，其余生命周期事件记为 `info`。
/// 逐帧事件量大，只在 [`with_frames`](Self::with_frames) 之后以 `debug` 输出。
pub struct LoggingListener {
    prefix: String,
    frames: bool,
}

impl LoggingListener {
    /// 创建
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            frames: false,
        }
    }

    /// 同时记录逐帧事件
    pub fn with_frames(mut self) -> Self {
        self.frames = true;
        self
    }
}

impl EventListener for LoggingListener {
    fn on_event(&self, event: &WorkflowEvent) {
        let p = &self.prefix;
        match event {
            WorkflowEvent::TaskCreated {
                task_id,
                num_points,
                num_components,
            } => info!(
                "{}: task {} created ({} points, {} components)",
                p, task_id, num_points, num_components
            ),
            WorkflowEvent::TaskStarted { task_id } => info!("{}: task {} running", p, task_id),
            WorkflowEvent::FrameAppended {
                task_id,
                time,
                evicted,
            } => {
                if self.frames {
                    debug!("{}: task {} t={:.3}s (evicted {})", p, task_id, time, evicted);
                }
            }
            WorkflowEvent::PacingLagged {
                task_id,
                compute_secs,
                dt,
            } => warn!(
                "{}: task {} behind real time, step took {:.3}s for dt={}s",
                p, task_id, compute_secs, dt
            ),
            WorkflowEvent::TaskPaused { task_id } => info!("{}: task {} paused", p, task_id),
            WorkflowEvent::TaskResumed { task_id } => info!("{}: task {} resumed", p, task_id),
            WorkflowEvent::TaskStopped { task_id } => {
                info!("{}: task {} stopped, results released", p, task_id)
            }
            WorkflowEvent::TaskCompleted {
                task_id,
                frames,
                duration_secs,
            } => info!(
                "{}: task {} completed with {} frames after {:.2}s",
                p, task_id, frames, duration_secs
            ),
            WorkflowEvent::TaskFailed { task_id, error } => {
                error!("{}: task {} failed: {}", p, task_id, error)
            }
            WorkflowEvent::TaskRemoved { task_id } => debug!("{}: task {} removed", p, task_id),
        }
    }

    fn name(&self) -> &str {
        &self.prefix
    }
}

/// 事件分发器
///
/// 分发前先复制监听器列表并释放读锁，监听器内部可以再注册或注销监听器。
/// 事件在发出它的线程上同步投递：驱动线程的逐帧事件会占用该任务的节拍时间，
/// 监听器应当保持轻量。
#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
}

impl EventDispatcher {
    /// 创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册监听器
    pub fn add_listener(&self, listener: Arc<dyn EventListener>) {
        debug!("Registered event listener '{}'", listener.name());
        self.listeners.write().push(listener);
    }

    /// 注册闭包监听器
    pub fn add_fn_listener<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&WorkflowEvent) + Send + Sync + 'static,
    {
        self.add_listener(Arc::new(FnListener::new(name, handler)));
    }

    /// 注销监听器，返回是否找到
    pub fn remove_listener(&self, listener: &Arc<dyn EventListener>) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        listeners.len() != before
    }

    /// 投递事件
    pub fn emit(&self, event: WorkflowEvent) {
        let listeners: Vec<Arc<dyn EventListener>> = self.listeners.read().clone();
        trace!("{} for task {} -> {} listeners", event.name(), event.task_id(), listeners.len());
        for listener in &listeners {
            listener.on_event(&event);
        }
    }

    /// 监听器数量
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_emit_reaches_listeners_in_order() {
        let dispatcher = EventDispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b"] {
            let seen = Arc::clone(&seen);
            dispatcher.add_fn_listener(tag, move |event| {
                seen.lock().push(format!("{}:{}", tag, event.name()));
            });
        }

        let task_id = TaskId::new();
        dispatcher.emit(WorkflowEvent::TaskStarted { task_id });
        dispatcher.emit(WorkflowEvent::FrameAppended {
            task_id,
            time: 0.2,
            evicted: 0,
        });

        assert_eq!(
            *seen.lock(),
            vec![
                "a:TaskStarted",
                "b:TaskStarted",
                "a:FrameAppended",
                "b:FrameAppended"
            ]
        );
    }

    #[test]
    fn test_listener_may_register_during_emit() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let inner = Arc::clone(&dispatcher);
        dispatcher.add_fn_listener("spawner", move |event| {
            if let WorkflowEvent::TaskCreated { .. } = event {
                inner.add_listener(Arc::new(LoggingListener::new("late")));
            }
        });

        dispatcher.emit(WorkflowEvent::TaskCreated {
            task_id: TaskId::new(),
            num_points: 4,
            num_components: 10,
        });
        assert_eq!(dispatcher.listener_count(), 2);
    }

    #[test]
    fn test_remove_listener() {
        let dispatcher = EventDispatcher::new();
        let listener: Arc<dyn EventListener> = Arc::new(LoggingListener::new("wave").with_frames());
        dispatcher.add_listener(Arc::clone(&listener));
        assert_eq!(listener.name(), "wave");

        dispatcher.emit(WorkflowEvent::PacingLagged {
            task_id: TaskId::new(),
            compute_secs: 0.5,
            dt: 0.2,
        });
        assert!(dispatcher.remove_listener(&listener));
        assert!(!dispatcher.remove_listener(&listener));
        assert_eq!(dispatcher.listener_count(), 0);
    }

    #[test]
    fn test_event_task_id() {
        let task_id = TaskId::new();
        let event = WorkflowEvent::TaskFailed {
            task_id,
            error: "worker lost".into(),
        };
        assert_eq!(event.task_id(), task_id);
        assert_eq!(event.name(), "TaskFailed");
    }
}

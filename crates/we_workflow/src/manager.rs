// crates/we_workflow/src/manager.rs

//! 任务管理器模块
//!
//! 对外暴露任务的创建、查询与控制。所有操作都是同步的：
//! 创建时同步生成网格与波浪谱并写入 t=0 帧，随后启动驱动线程；
//! 查询只在任务锁内复制 `Arc`，插值等计算在锁外完成。

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use we_config::{ConfigError, EngineConfig, SimulationRequest};
use we_foundation::WeError;
use we_interp::{frames_to_wave_grid, query_point};
use we_physics::{simulate_dense, ComputePool, SimulationFrame, SimulationStepper, WaveGrid};

use crate::cache::{subsample_indices, FrameCache, RetentionWindow};
use crate::cell::{TaskCell, TaskState};
use crate::events::{EventDispatcher, WorkflowEvent};
use crate::job::{FrameQuery, PointSample, SimulationTask, TaskId, TaskStatus, TaskSummary};
use crate::runner::{DriverSettings, TaskDriver};
use crate::storage::{MemoryTaskStore, StorageError, TaskStore};

/// 工作流错误
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// 请求参数无效，任务不会创建
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// 波浪谱模型未实现
    #[error("Unsupported spectrum model: {0}")]
    UnsupportedModel(String),

    /// 任务不存在
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    /// 任务尚无结果
    #[error("Task {0} has no results yet")]
    NoFrames(TaskId),

    /// 请求时刻已被淘汰
    #[error(
        "Requested time {requested:.2} s is outside the retention window \
         [{window_start:.2}, {window_end:.2}] s (retention {retention:.2} s)"
    )]
    ResourceExpired {
        /// 请求时刻
        requested: f64,
        /// 窗口起点
        window_start: f64,
        /// 窗口终点
        window_end: f64,
        /// 保留时长
        retention: f64,
    },

    /// 后台步进失败且没有可用帧
    #[error("Task {id} failed: {message}")]
    TaskFailed {
        /// 任务ID
        id: TaskId,
        /// 错误信息
        message: String,
    },

    /// 任务仍在运行，不允许该操作
    #[error("Task {0} is still active")]
    TaskActive(TaskId),

    /// 存储错误
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// 引擎内部错误
    #[error("Engine error: {0}")]
    Engine(WeError),
}

impl WorkflowError {
    /// 是否属于“未找到”类错误
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::NoFrames(_))
    }

    fn expired(requested: f64, window: RetentionWindow) -> Self {
        Self::ResourceExpired {
            requested,
            window_start: window.start,
            window_end: window.end,
            retention: window.retention,
        }
    }
}

impl From<ConfigError> for WorkflowError {
    fn from(e: ConfigError) -> Self {
        Self::InvalidConfiguration(e.to_string())
    }
}

impl From<WeError> for WorkflowError {
    fn from(e: WeError) -> Self {
        match e {
            WeError::UnsupportedModel { model, .. } => Self::UnsupportedModel(model),
            WeError::InvalidInput { .. } | WeError::OutOfRange { .. } => {
                Self::InvalidConfiguration(e.to_string())
            }
            other => Self::Engine(other),
        }
    }
}

/// 工作流结果类型
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// 模拟任务管理器
pub struct SimulationManager<S: TaskStore = MemoryTaskStore> {
    store: S,
    pool: ComputePool,
    config: EngineConfig,
    events: Arc<EventDispatcher>,
}

impl SimulationManager<MemoryTaskStore> {
    /// 以内存注册表创建管理器
    pub fn new(config: EngineConfig) -> WorkflowResult<Self> {
        let store = match config.max_tasks {
            Some(max) => MemoryTaskStore::with_capacity(max),
            None => MemoryTaskStore::new(),
        };
        Self::with_store(config, store)
    }
}

impl<S: TaskStore> SimulationManager<S> {
    /// 以指定注册表创建管理器
    pub fn with_store(config: EngineConfig, store: S) -> WorkflowResult<Self> {
        config.validate()?;
        let pool = ComputePool::new(config.worker_threads)?;
        info!(
            "Simulation manager ready ({} compute threads, realtime={})",
            pool.num_threads(),
            config.realtime
        );
        Ok(Self {
            store,
            pool,
            config,
            events: Arc::new(EventDispatcher::new()),
        })
    }

    /// 事件分发器
    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// 计算线程池
    pub fn pool(&self) -> &ComputePool {
        &self.pool
    }

    /// 引擎配置
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // 创建
    // =========================================================================

    /// 创建实时任务
    ///
    /// 同步完成网格与波浪谱生成，写入 t=0 帧后启动驱动线程。
    pub fn create(&self, request: SimulationRequest) -> WorkflowResult<TaskId> {
        request.validate()?;
        let mut stepper = SimulationStepper::new(&request, &self.pool)?;
        let first = stepper
            .step()?
            .ok_or_else(|| WeError::internal("stepper produced no t=0 frame"))?;

        let num_points = stepper.grid().len();
        let num_components = stepper.spectrum().len();
        let mut frames = FrameCache::new(request.time.cache_retention_time);
        frames.push(Arc::new(first))?;

        let mut task = SimulationTask::new(request, num_points, num_components);
        let id = task.id;
        task.mark_started();
        let cell = Arc::new(TaskCell::new(task, frames, None));
        self.store.insert(Arc::clone(&cell))?;

        self.events.emit(WorkflowEvent::TaskCreated {
            task_id: id,
            num_points,
            num_components,
        });

        let driver = TaskDriver::new(
            Arc::clone(&cell),
            stepper,
            self.pool.clone(),
            Arc::clone(&self.events),
            DriverSettings::from(&self.config),
        );
        match driver.spawn() {
            Ok(handle) => cell.set_worker(handle),
            Err(e) => {
                let message = format!("failed to spawn driver thread: {}", e);
                cell.lock().task.mark_failed(message.clone());
                self.events.emit(WorkflowEvent::TaskFailed {
                    task_id: id,
                    error: message.clone(),
                });
                return Err(WorkflowError::Engine(WeError::internal(message)));
            }
        }

        info!("Task created: {} ({} points, {} components)", id, num_points, num_components);
        self.events.emit(WorkflowEvent::TaskStarted { task_id: id });
        Ok(id)
    }

    /// 创建批量任务
    ///
    /// 需要有限的 `T_total`；一次性算出全部时刻，任务直接进入完成状态。
    pub fn create_batch(&self, request: SimulationRequest) -> WorkflowResult<TaskId> {
        request.validate()?;
        if request.time.time_limit().is_none() {
            return Err(WorkflowError::InvalidConfiguration(
                "batch simulation requires a finite T_total".to_string(),
            ));
        }

        let grid = simulate_dense(&request, &self.pool)?;
        let num_points = grid.num_points();
        let num_times = grid.num_times();

        let retention = request.time.cache_retention_time;
        let mut task = SimulationTask::new(request, num_points, 0);
        task.mark_started();
        task.mark_completed();
        let id = task.id;
        let cell = Arc::new(TaskCell::new(task, FrameCache::new(retention), Some(Arc::new(grid))));
        self.store.insert(cell)?;

        info!("Batch task created: {} ({} samples x {} points)", id, num_times, num_points);
        self.events.emit(WorkflowEvent::TaskCreated {
            task_id: id,
            num_points,
            num_components: 0,
        });
        self.events.emit(WorkflowEvent::TaskCompleted {
            task_id: id,
            frames: num_times,
            duration_secs: 0.0,
        });
        Ok(id)
    }

    // =========================================================================
    // 查询
    // =========================================================================

    fn cell(&self, id: TaskId) -> WorkflowResult<Arc<TaskCell>> {
        self.store.get(id).ok_or(WorkflowError::NotFound(id))
    }

    /// 任务状态
    pub fn status(&self, id: TaskId) -> WorkflowResult<TaskStatus> {
        Ok(self.cell(id)?.status())
    }

    /// 任务记录快照
    pub fn get_task(&self, id: TaskId) -> WorkflowResult<SimulationTask> {
        Ok(self.cell(id)?.task())
    }

    /// 任务摘要
    pub fn get_summary(&self, id: TaskId) -> WorkflowResult<TaskSummary> {
        Ok(self.cell(id)?.summary())
    }

    /// 最新帧
    pub fn get_latest_frame(&self, id: TaskId) -> WorkflowResult<Arc<SimulationFrame>> {
        self.get_frame(id, FrameQuery::Latest)
    }

    /// 最接近 `time` 的帧
    pub fn get_frame_near(&self, id: TaskId, time: f64) -> WorkflowResult<Arc<SimulationFrame>> {
        self.get_frame(id, FrameQuery::Exact(time))
    }

    /// 按查询方式取单帧
    pub fn get_frame(&self, id: TaskId, query: FrameQuery) -> WorkflowResult<Arc<SimulationFrame>> {
        let cell = self.cell(id)?;
        let state = cell.lock();

        if !state.frames.is_empty() {
            let frame = match query {
                FrameQuery::Latest => state.frames.latest(),
                FrameQuery::Exact(time) => {
                    if let Some(window) = state.frames.window() {
                        if window.is_expired(time) {
                            return Err(WorkflowError::expired(time, window));
                        }
                    }
                    state.frames.nearest(time)
                }
            };
            return frame.cloned().ok_or_else(|| no_results(&state));
        }

        let Some(grid) = state.dense.clone() else {
            return Err(no_results(&state));
        };
        let region = state.task.request.region;
        let retention = state.frames.retention();
        drop(state);

        let index = match query {
            FrameQuery::Latest => grid.num_times().saturating_sub(1),
            FrameQuery::Exact(time) => {
                check_dense_window(&grid, retention, time)?;
                grid.nearest_time_index(time)
            }
        };
        grid.frame_at(index, region)
            .map(Arc::new)
            .ok_or(WorkflowError::NoFrames(id))
    }

    /// 时间区间内的帧
    ///
    /// 帧数超过 `max_frames` 时按下标均匀抽样。
    /// 保留窗口生效时，`time_min` 早于窗口起点返回 [`WorkflowError::ResourceExpired`]。
    pub fn get_frames_in_range(
        &self,
        id: TaskId,
        time_min: Option<f64>,
        time_max: Option<f64>,
        max_frames: usize,
    ) -> WorkflowResult<Vec<Arc<SimulationFrame>>> {
        let cell = self.cell(id)?;
        let state = cell.lock();

        if !state.frames.is_empty() {
            if let (Some(window), Some(t)) = (state.frames.window(), time_min) {
                if window.is_expired(t) {
                    return Err(WorkflowError::expired(t, window));
                }
            }
            return Ok(state.frames.range(time_min, time_max, max_frames));
        }

        let Some(grid) = state.dense.clone() else {
            return Err(no_results(&state));
        };
        let region = state.task.request.region;
        let retention = state.frames.retention();
        drop(state);

        if let Some(t) = time_min {
            check_dense_window(&grid, retention, t)?;
        }
        let selected: Vec<usize> = grid
            .times
            .iter()
            .enumerate()
            .filter(|&(_, &t)| time_min.map_or(true, |min| t >= min))
            .filter(|&(_, &t)| time_max.map_or(true, |max| t <= max))
            .map(|(i, _)| i)
            .collect();
        Ok(subsample_indices(selected.len(), max_frames)
            .into_iter()
            .filter_map(|k| grid.frame_at(selected[k], region))
            .map(Arc::new)
            .collect())
    }

    /// 单点波面高度查询
    ///
    /// 有批量结果时直接在其上插值，否则由当前缓存的帧重建稠密网格。
    pub fn query_point(
        &self,
        id: TaskId,
        lon: f64,
        lat: f64,
        query: FrameQuery,
    ) -> WorkflowResult<PointSample> {
        let cell = self.cell(id)?;
        let (grid, time) = {
            let state = cell.lock();
            let retention = state.frames.retention();

            if let Some(grid) = state.dense.clone().filter(|_| state.frames.is_empty()) {
                let Some(&latest) = grid.times.last() else {
                    return Err(no_results(&state));
                };
                let time = match query {
                    FrameQuery::Latest => latest,
                    FrameQuery::Exact(t) => t,
                };
                check_dense_window(&grid, retention, time)?;
                (GridSource::Dense(grid), time)
            } else {
                let Some(latest) = state.frames.latest_time() else {
                    return Err(no_results(&state));
                };
                let time = match query {
                    FrameQuery::Latest => latest,
                    FrameQuery::Exact(t) => t,
                };
                if let Some(window) = state.frames.window() {
                    if window.is_expired(time) {
                        return Err(WorkflowError::expired(time, window));
                    }
                }
                (GridSource::Frames(state.frames.snapshot()), time)
            }
        };

        let grid = match grid {
            GridSource::Dense(grid) => grid,
            GridSource::Frames(frames) => {
                Arc::new(frames_to_wave_grid(frames.iter().map(|f| f.as_ref()))?)
            }
        };
        let wave_height = query_point(&grid, lon, lat, time)?;
        debug!("Point query {} ({}, {}) t={} -> {}", id, lon, lat, time, wave_height);
        Ok(PointSample {
            time,
            lon,
            lat,
            wave_height,
        })
    }

    /// 任务列表，可按状态过滤
    pub fn list_tasks(&self, filter: Option<TaskStatus>) -> Vec<TaskSummary> {
        let mut summaries: Vec<TaskSummary> = self
            .store
            .list()
            .iter()
            .map(|cell| cell.summary())
            .filter(|s| filter.map_or(true, |status| s.status == status))
            .collect();
        summaries.sort_by_key(|s| s.created_at);
        summaries
    }

    /// 任务总数
    pub fn task_count(&self) -> usize {
        self.store.count()
    }

    // =========================================================================
    // 控制
    // =========================================================================

    /// 暂停任务，终止状态或已暂停时不做任何事
    pub fn pause(&self, id: TaskId) -> WorkflowResult<TaskStatus> {
        let cell = self.cell(id)?;
        {
            let mut state = cell.lock();
            if !state.task.status.can_pause() {
                return Ok(state.task.status);
            }
            cell.control().pause();
            state.task.mark_paused();
        }
        info!("Task paused: {}", id);
        self.events.emit(WorkflowEvent::TaskPaused { task_id: id });
        Ok(TaskStatus::Paused)
    }

    /// 恢复任务，非暂停状态时不做任何事
    pub fn resume(&self, id: TaskId) -> WorkflowResult<TaskStatus> {
        let cell = self.cell(id)?;
        {
            let mut state = cell.lock();
            if !state.task.status.can_resume() {
                return Ok(state.task.status);
            }
            cell.control().resume();
            state.task.mark_resumed();
        }
        info!("Task resumed: {}", id);
        self.events.emit(WorkflowEvent::TaskResumed { task_id: id });
        Ok(TaskStatus::Running)
    }

    /// 停止任务并释放全部帧与批量结果
    ///
    /// 已完成或失败的任务不受影响；已停止的任务会再次清理。
    /// 返回后不会再有新帧写入。
    pub fn stop(&self, id: TaskId) -> WorkflowResult<TaskStatus> {
        let cell = self.cell(id)?;
        let changed = {
            let mut state = cell.lock();
            match state.task.status {
                TaskStatus::Completed | TaskStatus::Failed => return Ok(state.task.status),
                TaskStatus::Stopped => {
                    cell.control().cancel();
                    state.clear_results();
                    false
                }
                _ => {
                    cell.control().cancel();
                    state.clear_results();
                    state.task.mark_stopped();
                    true
                }
            }
        };
        if changed {
            info!("Task stopped: {}", id);
            self.events.emit(WorkflowEvent::TaskStopped { task_id: id });
        }
        Ok(TaskStatus::Stopped)
    }

    /// 阻塞等待任务的驱动线程退出，返回最终状态
    ///
    /// 无时间上限且未被停止的任务不会退出，调用方需先 [`stop`](Self::stop)。
    pub fn wait(&self, id: TaskId) -> WorkflowResult<TaskStatus> {
        let cell = self.cell(id)?;
        cell.join_worker();
        Ok(cell.status())
    }

    /// 移除终止状态的任务
    pub fn remove_task(&self, id: TaskId) -> WorkflowResult<()> {
        let cell = self.cell(id)?;
        if !cell.status().is_terminal() {
            return Err(WorkflowError::TaskActive(id));
        }
        cell.join_worker();
        self.store.remove(id)?;
        debug!("Task removed: {}", id);
        self.events.emit(WorkflowEvent::TaskRemoved { task_id: id });
        Ok(())
    }

    /// 移除全部终止状态的任务，返回移除数量
    pub fn cleanup_terminal(&self) -> usize {
        let terminal: Vec<TaskId> = self
            .store
            .list()
            .iter()
            .filter(|cell| cell.status().is_terminal())
            .map(|cell| cell.id())
            .collect();
        terminal
            .into_iter()
            .filter(|&id| self.remove_task(id).is_ok())
            .count()
    }

    /// 停止全部任务，等待驱动线程退出后清空注册表
    pub fn shutdown(&self) {
        let cells = self.store.list();
        if cells.is_empty() {
            return;
        }
        info!("Shutting down {} tasks", cells.len());
        for cell in &cells {
            if let Err(e) = self.stop(cell.id()) {
                warn!("Failed to stop task {}: {}", cell.id(), e);
            }
        }
        for cell in &cells {
            cell.join_worker();
        }
        self.store.clear();
    }
}

impl<S: TaskStore> Drop for SimulationManager<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<S: TaskStore> std::fmt::Debug for SimulationManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationManager")
            .field("tasks", &self.store.count())
            .field("pool", &self.pool)
            .field("config", &self.config)
            .finish()
    }
}

/// 点查询所用的数据来源
enum GridSource {
    Dense(Arc<WaveGrid>),
    Frames(Vec<Arc<SimulationFrame>>),
}

/// 无可用结果时的错误：失败任务报告失败原因，其余报告尚无结果
fn no_results(state: &TaskState) -> WorkflowError {
    match (&state.task.status, &state.task.error) {
        (TaskStatus::Failed, Some(message)) => WorkflowError::TaskFailed {
            id: state.task.id,
            message: message.clone(),
        },
        _ => WorkflowError::NoFrames(state.task.id),
    }
}

/// 批量结果的保留窗口检查，窗口终点取最后一个采样时刻
fn check_dense_window(grid: &WaveGrid, retention: Option<f64>, time: f64) -> WorkflowResult<()> {
    let (Some(retention), Some(&latest)) = (retention, grid.times.last()) else {
        return Ok(());
    };
    let window = RetentionWindow::new(latest, retention);
    if window.is_expired(time) {
        return Err(WorkflowError::expired(time, window));
    }
    Ok(())
}

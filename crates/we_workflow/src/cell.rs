// crates/we_workflow/src/cell.rs

//! 任务单元
//!
//! 注册表中每个任务对应一个 [`TaskCell`]：任务记录、帧缓存和批量结果
//! 由同一把互斥锁保护，外部控制请求与后台驱动线程对同一任务的读写在此串行化。
//! 暂停/停止标志是独立的原子量，驱动线程无需持锁即可轮询。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Mutex, MutexGuard};

use we_foundation::WeResult;
use we_physics::{SimulationFrame, WaveGrid};

use crate::cache::FrameCache;
use crate::job::{SimulationTask, TaskId, TaskStatus, TaskSummary};

/// 控制标志
#[derive(Debug, Default)]
pub struct TaskControl {
    cancel_flag: AtomicBool,
    pause_flag: AtomicBool,
}

impl TaskControl {
    /// 请求停止
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
    }

    /// 请求暂停
    pub fn pause(&self) {
        self.pause_flag.store(true, Ordering::SeqCst);
    }

    /// 请求恢复
    pub fn resume(&self) {
        self.pause_flag.store(false, Ordering::SeqCst);
    }

    /// 是否已请求停止
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::SeqCst)
    }

    /// 是否处于暂停
    pub fn is_paused(&self) -> bool {
        self.pause_flag.load(Ordering::SeqCst)
    }
}

/// 受锁保护的任务数据
#[derive(Debug)]
pub(crate) struct TaskState {
    pub(crate) task: SimulationTask,
    pub(crate) frames: FrameCache,
    pub(crate) dense: Option<Arc<WaveGrid>>,
}

impl TaskState {
    /// 释放全部结果数据
    pub(crate) fn clear_results(&mut self) {
        self.frames.clear();
        self.dense = None;
    }

    pub(crate) fn summary(&self) -> TaskSummary {
        let (frame_count, latest_time) = match (&self.dense, self.frames.is_empty()) {
            (Some(grid), true) => (grid.num_times(), grid.times.last().copied()),
            _ => (self.frames.len(), self.frames.latest_time()),
        };
        TaskSummary {
            id: self.task.id,
            status: self.task.status,
            created_at: self.task.created_at,
            frame_count,
            latest_time,
            error: self.task.error.clone(),
        }
    }
}

/// 注册表中的任务单元
#[derive(Debug)]
pub struct TaskCell {
    id: TaskId,
    state: Mutex<TaskState>,
    control: TaskControl,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TaskCell {
    pub(crate) fn new(task: SimulationTask, frames: FrameCache, dense: Option<Arc<WaveGrid>>) -> Self {
        Self {
            id: task.id,
            state: Mutex::new(TaskState {
                task,
                frames,
                dense,
            }),
            control: TaskControl::default(),
            worker: Mutex::new(None),
        }
    }

    /// 任务ID
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// 当前状态
    pub fn status(&self) -> TaskStatus {
        self.state.lock().task.status
    }

    /// 任务记录快照
    pub fn task(&self) -> SimulationTask {
        self.state.lock().task.clone()
    }

    /// 摘要
    pub fn summary(&self) -> TaskSummary {
        self.state.lock().summary()
    }

    /// 控制标志
    pub fn control(&self) -> &TaskControl {
        &self.control
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, TaskState> {
        self.state.lock()
    }

    /// 追加一帧，返回淘汰的帧数；已请求停止时丢弃该帧并返回 `None`
    ///
    /// 停止标志在锁内检查，停止请求清空帧之后不会再有帧写入。
    pub(crate) fn append_frame(&self, frame: SimulationFrame) -> WeResult<Option<usize>> {
        let mut state = self.state.lock();
        if self.control.is_cancelled() {
            return Ok(None);
        }
        state.frames.push(Arc::new(frame)).map(Some)
    }

    pub(crate) fn set_worker(&self, handle: JoinHandle<()>) {
        *self.worker.lock() = Some(handle);
    }

    /// 等待驱动线程退出
    pub(crate) fn join_worker(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::warn!("Task {} driver thread panicked", self.id);
            }
        }
    }
}

// crates/we_workflow/src/runner.rs

//! 任务驱动循环
//!
//! 每个实时任务由一个独立命名线程驱动。t=0 帧在创建任务时已同步写入，
//! 线程启动后先投递下一帧的预计算，然后循环：
//!
//! 1. 检查停止与暂停（暂停时按固定间隔睡眠轮询，不释放任何数据）
//! 2. 取回预计算结果（循环中唯一的阻塞点），步进器随即投递再下一帧
//! 3. 实时模式下睡满 `dt_backend` 的剩余时间；计算慢于 `dt_backend` 时不追帧
//! 4. 提交前再次检查停止与暂停，随后在任务锁内追加帧
//!
//! 循环内的错误与 panic 都在线程边界被捕获，任务标记为失败，不重试。

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{error, info, trace, warn};

use we_config::EngineConfig;
use we_foundation::{WeError, WeResult};
use we_physics::{ComputePool, SimulationStepper};

use crate::cell::TaskCell;
use crate::events::{EventDispatcher, WorkflowEvent};

/// 驱动参数
#[derive(Debug, Clone, Copy)]
pub struct DriverSettings {
    /// 暂停轮询间隔
    pub pause_poll: Duration,
    /// 是否按墙钟节拍推进
    pub realtime: bool,
}

impl From<&EngineConfig> for DriverSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            pause_poll: Duration::from_millis(config.pause_poll_ms),
            realtime: config.realtime,
        }
    }
}

/// 循环退出原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    Completed,
    Stopped,
}

/// 单个任务的驱动器
pub(crate) struct TaskDriver {
    cell: Arc<TaskCell>,
    stepper: SimulationStepper,
    pool: ComputePool,
    events: Arc<EventDispatcher>,
    settings: DriverSettings,
}

impl TaskDriver {
    pub(crate) fn new(
        cell: Arc<TaskCell>,
        stepper: SimulationStepper,
        pool: ComputePool,
        events: Arc<EventDispatcher>,
        settings: DriverSettings,
    ) -> Self {
        Self {
            cell,
            stepper,
            pool,
            events,
            settings,
        }
    }

    /// 在新线程中启动
    pub(crate) fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        let id = self.cell.id().to_string();
        let name = format!("wave-task-{}", &id[..8]);
        thread::Builder::new().name(name).spawn(move || self.run())
    }

    fn run(mut self) {
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_loop()));

        let result = match outcome {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(payload) => Err(panic_message(payload.as_ref())),
        };

        match result {
            Ok(LoopExit::Completed) => self.finish_completed(started),
            Ok(LoopExit::Stopped) => self.finish_stopped(),
            Err(_) if self.cell.control().is_cancelled() => self.finish_stopped(),
            Err(message) => self.finish_failed(message),
        }
    }

    fn run_loop(&mut self) -> WeResult<LoopExit> {
        let cell = Arc::clone(&self.cell);
        let id = cell.id();
        let dt_secs = self.stepper.dt();
        let dt = Duration::try_from_secs_f64(dt_secs)
            .map_err(|e| WeError::invalid_input(format!("dt_backend={}: {}", dt_secs, e)))?;

        info!(
            "Task {} driver started (dt={}s, realtime={}, limit={:?})",
            id,
            dt_secs,
            self.settings.realtime,
            self.stepper.time_limit()
        );

        self.stepper.precompute_next(&self.pool);
        loop {
            if !self.wait_while_paused() {
                self.stepper.stop();
                return Ok(LoopExit::Stopped);
            }

            let start = Instant::now();
            let next = self.stepper.collect_precomputed(&self.pool)?;
            let compute = start.elapsed();

            let Some(frame) = next else {
                if cell.control().is_cancelled() || self.stepper.is_stopped() {
                    return Ok(LoopExit::Stopped);
                }
                return Ok(LoopExit::Completed);
            };

            if self.settings.realtime {
                if compute < dt {
                    thread::sleep(dt - compute);
                } else {
                    warn!(
                        "Task {} lagging: step took {:.3}s, dt={}s",
                        id,
                        compute.as_secs_f64(),
                        dt_secs
                    );
                    self.events.emit(WorkflowEvent::PacingLagged {
                        task_id: id,
                        compute_secs: compute.as_secs_f64(),
                        dt: dt_secs,
                    });
                }
            }

            // 暂停期间持有该帧，恢复后再提交
            if !self.wait_while_paused() {
                self.stepper.stop();
                return Ok(LoopExit::Stopped);
            }

            let time = frame.time;
            let Some(evicted) = cell.append_frame(frame)? else {
                self.stepper.stop();
                return Ok(LoopExit::Stopped);
            };
            trace!("Task {} frame t={:.3}s (evicted {})", id, time, evicted);
            self.events.emit(WorkflowEvent::FrameAppended {
                task_id: id,
                time,
                evicted,
            });
        }
    }

    /// 暂停时轮询等待；收到停止请求返回 `false`
    fn wait_while_paused(&self) -> bool {
        let control = self.cell.control();
        loop {
            if control.is_cancelled() {
                return false;
            }
            if !control.is_paused() {
                return true;
            }
            thread::sleep(self.settings.pause_poll);
        }
    }

    fn finish_completed(&self, started: Instant) {
        let id = self.cell.id();
        let frames = {
            let mut state = self.cell.lock();
            if self.cell.control().is_cancelled() {
                None
            } else {
                if !state.task.status.is_terminal() {
                    state.task.mark_completed();
                }
                Some(state.frames.len())
            }
        };

        match frames {
            Some(frames) => {
                let duration_secs = started.elapsed().as_secs_f64();
                info!("Task {} completed: {} frames in {:.2}s", id, frames, duration_secs);
                self.events.emit(WorkflowEvent::TaskCompleted {
                    task_id: id,
                    frames,
                    duration_secs,
                });
            }
            None => self.finish_stopped(),
        }
    }

    fn finish_stopped(&self) {
        let id = self.cell.id();
        let changed = {
            let mut state = self.cell.lock();
            state.clear_results();
            if state.task.status.is_terminal() {
                false
            } else {
                state.task.mark_stopped();
                true
            }
        };

        info!("Task {} driver exited (stopped)", id);
        if changed {
            self.events.emit(WorkflowEvent::TaskStopped { task_id: id });
        }
    }

    fn finish_failed(&self, message: String) {
        let id = self.cell.id();
        {
            let mut state = self.cell.lock();
            if !state.task.status.is_terminal() {
                state.task.mark_failed(message.clone());
            }
        }

        error!("Task {} failed: {}", id, message);
        self.events.emit(WorkflowEvent::TaskFailed {
            task_id: id,
            error: message,
        });
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic: <unknown>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_engine_config() {
        let config = EngineConfig::default().with_pause_poll_ms(20).without_pacing();
        let settings = DriverSettings::from(&config);
        assert_eq!(settings.pause_poll, Duration::from_millis(20));
        assert!(!settings.realtime);
    }

    #[test]
    fn test_panic_message() {
        let payload = panic::catch_unwind(|| panic!("step exploded")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "panic: step exploded");

        let payload = panic::catch_unwind(|| std::panic::panic_any(7_i32)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "panic: <unknown>");
    }
}

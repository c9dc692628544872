// crates/we_workflow/src/lib.rs

//! WaveEnv 工作流层
//!
//! 管理区域海浪模拟任务的完整生命周期：
//!
//! - [`manager`]: 任务创建、帧与单点查询、暂停/恢复/停止
//! - [`runner`]: 每个任务一个驱动线程，按实时节拍推进并写入帧缓存
//! - [`cache`]: 带保留窗口的帧缓存
//! - [`cell`] / [`storage`]: 按任务加锁的内存注册表
//! - [`events`]: 生命周期事件分发
//!
//! # 示例
//!
//! ```no_run
//! use we_config::{EngineConfig, Region, SimulationRequest};
//! use we_workflow::{FrameQuery, SimulationManager};
//!
//! let manager = SimulationManager::new(EngineConfig::default()).unwrap();
//! let id = manager
//!     .create(SimulationRequest::new(Region::new(120.0, 30.0, 120.5, 30.5)))
//!     .unwrap();
//!
//! std::thread::sleep(std::time::Duration::from_secs(1));
//! let frame = manager.get_latest_frame(id).unwrap();
//! println!("t={} points={}", frame.time, frame.points.len());
//!
//! let sample = manager.query_point(id, 120.25, 30.25, FrameQuery::Latest).unwrap();
//! println!("h={}", sample.wave_height);
//! manager.stop(id).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod cell;
pub mod events;
pub mod job;
pub mod manager;
pub mod runner;
pub mod storage;

pub use cache::{FrameCache, RetentionWindow, DEFAULT_MAX_FRAMES};
pub use cell::{TaskCell, TaskControl};
pub use events::{EventDispatcher, EventListener, FnListener, LoggingListener, WorkflowEvent};
pub use job::{FrameQuery, PointSample, SimulationTask, TaskId, TaskStatus, TaskSummary};
pub use manager::{SimulationManager, WorkflowError, WorkflowResult};
pub use runner::DriverSettings;
pub use storage::{MemoryTaskStore, StorageError, TaskStore};

// crates/we_foundation/src/lib.rs

//! WaveEnv Foundation Layer
//!
//! 基础层，提供整个项目共享的错误类型与数值容差。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `WeError` / `WeResult`
//! - [`tolerance`]: 时间、空间与振幅容差以及物理常数
//!
//! # 示例
//!
//! ```
//! use we_foundation::error::{WeError, WeResult};
//!
//! fn check_dt(dt: f64) -> WeResult<()> {
//!     WeError::check_range("dt_backend", dt, 1e-6, 3600.0)
//! }
//!
//! assert!(check_dt(0.2).is_ok());
//! assert!(check_dt(-1.0).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod tolerance;

// 重导出常用类型
pub use error::{WeError, WeResult};
pub use tolerance::{EARTH_RADIUS, GRAVITY};

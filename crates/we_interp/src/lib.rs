// crates/we_interp/src/lib.rs

//! 插值模块
//!
//! 对稠密波面时间序列做单点查询：时间方向线性插值，空间方向取最近 4 点
//! 反距离加权。
//!
//! # 模块
//!
//! - [`temporal`]: 时间插值与采样行选择
//! - [`idw`]: 最近邻反距离加权
//! - [`point`]: 单点查询
//! - [`reconstruct`]: 由帧序列重建稠密网格

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod idw;
pub mod point;
pub mod reconstruct;
pub mod temporal;

// 重导出常用类型
pub use idw::NearestIdw;
pub use point::{query_point, PointInterpolator};
pub use reconstruct::frames_to_wave_grid;
pub use temporal::{TemporalInterpolator, TimeSeriesSampler};

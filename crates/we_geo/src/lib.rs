// crates/we_geo/src/lib.rs
//! WaveEnv 地理空间处理模块
//!
//! 提供经纬度与本地平面坐标之间的近似转换，以及规则格网采样工具。
//!
//! # 模块
//!
//! - `geometry`: 几何类型 (Point2D)
//! - `projection`: 等距圆柱近似的本地投影
//!
//! # 示例
//!
//! ```
//! use we_geo::prelude::*;
//!
//! let proj = LocalProjection::new(120.25, 30.25);
//! let p = proj.forward(120.25, 30.25);
//! assert!(p.x.abs() < 1e-9 && p.y.abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod geometry;
pub mod projection;

/// 预导入模块
pub mod prelude {
    pub use crate::geometry::Point2D;
    pub use crate::projection::{linspace, lonlat_to_xy, xy_to_lonlat, LocalProjection};
}

// 重导出常用类型
pub use geometry::Point2D;
pub use projection::{linspace, lonlat_to_xy, xy_to_lonlat, LocalProjection};

// crates/we_physics/src/wind.rs

//! 静态风场
//!
//! 单次模拟内风速风向恒定，仅用于确定波浪谱的缺省主浪向。
//!
//! # 使用示例
//!
//! ```
//! use we_physics::wind::WindField;
//!
//! let wind = WindField::new(10.0, 90.0, 10.0);
//! let (u, v) = wind.components();
//! assert!((u - 10.0).abs() < 1e-10);
//! assert!(v.abs() < 1e-10);
//! ```

use glam::DVec2;
use we_config::WindConfig;

/// 恒定风场
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindField {
    /// 风速 [m/s]
    pub wind_speed: f64,
    /// 风向 [度]，0=北，顺时针
    pub wind_direction_deg: f64,
    /// 参考高度 [m]
    pub reference_height_m: f64,
}

impl WindField {
    /// 创建风场
    pub fn new(wind_speed: f64, wind_direction_deg: f64, reference_height_m: f64) -> Self {
        Self {
            wind_speed,
            wind_direction_deg,
            reference_height_m,
        }
    }

    /// 静风
    pub fn calm() -> Self {
        Self::new(0.0, 0.0, 10.0)
    }

    /// 本地平面分量 (u 向东, v 向北)
    ///
    /// 与波向约定一致：`u = s·sinθ`，`v = s·cosθ`。
    pub fn vector(&self) -> DVec2 {
        let dir_rad = self.wind_direction_deg.to_radians();
        DVec2::new(dir_rad.sin(), dir_rad.cos()) * self.wind_speed
    }

    /// 返回 (u, v) 分量 [m/s]
    pub fn components(&self) -> (f64, f64) {
        let w = self.vector();
        (w.x, w.y)
    }
}

impl From<&WindConfig> for WindField {
    fn from(config: &WindConfig) -> Self {
        Self::new(
            config.wind_speed,
            config.wind_direction_deg,
            config.reference_height_m,
        )
    }
}

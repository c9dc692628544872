// crates/we_physics/src/grid.rs

//! 规则经纬度网格
//!
//! 网格点按纬度外层、经度内层排列，本地坐标以区域中心为原点。
//! 点数超过 `max_points` 时两个方向按 `sqrt(max_points / n)` 等比缩减。

use serde::{Deserialize, Serialize};
use tracing::debug;

use we_config::{DiscretizationConfig, Region};
use we_foundation::{WeError, WeResult};
use we_geo::{linspace, LocalProjection};

/// 网格点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    /// 本地 x [m]，向东
    pub x: f64,
    /// 本地 y [m]，向北
    pub y: f64,
    /// 经度 [度]
    pub lon: f64,
    /// 纬度 [度]
    pub lat: f64,
    /// 水深 [m]
    pub depth: f64,
}

/// 网格构建器
#[derive(Debug, Clone, Copy)]
pub struct GridBuilder<'a> {
    region: &'a Region,
    config: &'a DiscretizationConfig,
}

impl<'a> GridBuilder<'a> {
    /// 创建构建器
    pub fn new(region: &'a Region, config: &'a DiscretizationConfig) -> Self {
        Self { region, config }
    }

    /// 按 dx/dy 直接划分的点数，未做 `max_points` 限制（超出 `usize` 时饱和）
    pub fn requested_dimensions(&self) -> (usize, usize) {
        let (n_lon, n_lat) = self.naive_counts();
        (n_lon as usize, n_lat as usize)
    }

    /// 经纬度方向的点数 (n_lon, n_lat)
    ///
    /// 结果总满足 `n_lon * n_lat <= max_points`。全程在 `f64` 中计算，
    /// 极小的 dx/dy 不会溢出。
    pub fn dimensions(&self) -> (usize, usize) {
        let max_points = self.config.max_points.max(1) as f64;
        let (naive_lon, naive_lat) = self.naive_counts();

        // 单轴先截到 max_points，乘积保持有限
        let mut n_lon = naive_lon.min(max_points);
        let mut n_lat = naive_lat.min(max_points);

        if n_lon * n_lat > max_points {
            let scale = (max_points / (n_lon * n_lat)).sqrt();
            n_lon = (n_lon * scale).floor().max(1.0);
            n_lat = (n_lat * scale).floor().max(1.0);

            // 截断到 1 之后仍可能超限（极扁区域）
            if n_lon * n_lat > max_points {
                if n_lon >= n_lat {
                    n_lon = (max_points / n_lat).floor().max(1.0);
                } else {
                    n_lat = (max_points / n_lon).floor().max(1.0);
                }
            }
        }
        (n_lon as usize, n_lat as usize)
    }

    fn naive_counts(&self) -> (f64, f64) {
        (
            axis_count(self.region.lon_range(), self.config.dx),
            axis_count(self.region.lat_range(), self.config.dy),
        )
    }

    /// 构建网格点
    pub fn build(&self) -> WeResult<Vec<GridPoint>> {
        let region = self.region;
        if !(region.lon_range() > 0.0 && region.lat_range() > 0.0) {
            return Err(WeError::invalid_input(format!(
                "区域范围无效: lon [{}, {}], lat [{}, {}]",
                region.lon_min, region.lon_max, region.lat_min, region.lat_max
            )));
        }

        let (n_lon, n_lat) = self.dimensions();
        let lons = linspace(region.lon_min, region.lon_max, n_lon);
        let lats = linspace(region.lat_min, region.lat_max, n_lat);

        let (origin_lon, origin_lat) = region.centroid();
        let projection = LocalProjection::new(origin_lon, origin_lat);
        let lon_range = region.lon_range();
        let lat_range = region.lat_range();
        let depth_range = region.depth_max - region.depth_min;

        let mut points = Vec::with_capacity(n_lon * n_lat);
        for &lat in &lats {
            for &lon in &lons {
                let p = projection.forward(lon, lat);
                let lon_ratio = (lon - region.lon_min) / lon_range;
                let lat_ratio = (lat - region.lat_min) / lat_range;
                points.push(GridPoint {
                    x: p.x,
                    y: p.y,
                    lon,
                    lat,
                    depth: region.depth_min + depth_range * (lon_ratio + lat_ratio) / 2.0,
                });
            }
        }

        debug!("网格构建完成: {} x {} = {} 点", n_lon, n_lat, points.len());
        Ok(points)
    }
}

/// `floor(range / spacing) + 1`，可能为无穷大
fn axis_count(range: f64, spacing: f64) -> f64 {
    ((range / spacing).floor() + 1.0).max(1.0)
}

// crates/we_interp/src/point.rs

//! 单点查询
//!
//! 查询点的经纬度以 **全部网格点经纬度的算术平均** 为原点投影到本地坐标，
//! 再与网格点保存的本地坐标（以区域中心为原点）比较。
//! 对称规则网格上两个原点重合；非对称点集上二者会有偏差，查询结果以此为准。

use tracing::trace;

use we_foundation::{WeError, WeResult};
use we_geo::{LocalProjection, Point2D};
use we_physics::WaveGrid;

use crate::idw::NearestIdw;
use crate::temporal::TimeSeriesSampler;

/// 绑定到某个稠密网格的单点插值器
#[derive(Debug, Clone)]
pub struct PointInterpolator<'a> {
    grid: &'a WaveGrid,
    projection: LocalProjection,
    idw: NearestIdw,
}

impl<'a> PointInterpolator<'a> {
    /// 创建插值器
    pub fn new(grid: &'a WaveGrid) -> WeResult<Self> {
        let projection = LocalProjection::centered_on(grid.grid_points.iter().map(|p| (p.lon, p.lat)))
            .ok_or(WeError::EmptyGrid)?;
        let idw = NearestIdw::new(
            grid.grid_points
                .iter()
                .map(|p| Point2D::new(p.x, p.y))
                .collect(),
        );
        Ok(Self {
            grid,
            projection,
            idw,
        })
    }

    /// 查询用的投影原点 (lon, lat)
    pub fn origin(&self) -> Point2D {
        self.projection.origin()
    }

    /// 查询 (lon, lat) 在 `time` 时刻的波面高度
    pub fn query(&self, lon: f64, lat: f64, time: f64) -> WeResult<f64> {
        let sampler = TimeSeriesSampler::new(&self.grid.times, &self.grid.wave_heights)?;
        let values = sampler.sample(time)?;
        let p = self.projection.forward(lon, lat);
        let height = self.idw.interpolate(p.x, p.y, &values)?;
        trace!("点查询 ({}, {}) t={} -> {}", lon, lat, time, height);
        Ok(height)
    }
}

/// 一次性单点查询
pub fn query_point(grid: &WaveGrid, lon: f64, lat: f64, time: f64) -> WeResult<f64> {
    PointInterpolator::new(grid)?.query(lon, lat, time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use we_physics::GridPoint;

    fn lattice() -> WaveGrid {
        // 2 x 2 点，本地坐标以中心为原点
        let mut points = Vec::new();
        for (j, lat) in [0.0, 0.01].iter().enumerate() {
            for (i, lon) in [0.0, 0.01].iter().enumerate() {
                points.push(GridPoint {
                    x: (i as f64 - 0.5) * 1112.0,
                    y: (j as f64 - 0.5) * 1112.0,
                    lon: *lon,
                    lat: *lat,
                    depth: 10.0,
                });
            }
        }
        WaveGrid::new(
            points,
            vec![0.0, 1.0],
            vec![vec![1.0, 2.0, 3.0, 4.0], vec![3.0, 4.0, 5.0, 6.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_mean_origin() {
        let grid = lattice();
        let interp = PointInterpolator::new(&grid).unwrap();
        let origin = interp.origin();
        assert!((origin.x - 0.005).abs() < 1e-12);
        assert!((origin.y - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_center_query_averages() {
        let grid = lattice();
        let h = query_point(&grid, 0.005, 0.005, 0.0).unwrap();
        assert!((h - 2.5).abs() < 1e-9);

        // 时间中点
        let h = query_point(&grid, 0.005, 0.005, 0.5).unwrap();
        assert!((h - 3.5).abs() < 1e-9);
    }
}

// crates/we_interp/src/idw.rs

//! 最近邻反距离加权插值
//!
//! 取距查询点最近的 4 个采样点，权重
//! `wᵢ = 1 / (dᵢ + ε)` 归一化后加权求和。采样点少于邻居数时退化为最近邻。
//!
//! 不考虑网格拓扑，查询点不必落在某个单元内。
//!
//! # 示例
//!
//! ```
//! use we_geo::Point2D;
//! use we_interp::idw::NearestIdw;
//!
//! let idw = NearestIdw::new(vec![Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)]);
//! let z = idw.interpolate(1.0, 0.0, &[5.0, 7.0]).unwrap();
//! assert_eq!(z, 5.0);
//! ```

use we_foundation::tolerance::IDW_DISTANCE_EPS;
use we_foundation::{WeError, WeResult};
use we_geo::Point2D;

/// 参与加权的邻居数
pub const NEIGHBORS: usize = 4;

/// 最近邻 IDW 插值器
///
/// 只保存采样点位置；每次查询时传入对应的值，同一网格的多个时刻可复用。
#[derive(Debug, Clone)]
pub struct NearestIdw {
    points: Vec<Point2D>,
}

impl NearestIdw {
    /// 创建
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    /// 在 (x, y) 处插值
    pub fn interpolate(&self, x: f64, y: f64, values: &[f64]) -> WeResult<f64> {
        if self.points.is_empty() {
            return Err(WeError::EmptyGrid);
        }
        WeError::check_size("idw values", self.points.len(), values.len())?;

        let query = Point2D::new(x, y);
        let mut distances: Vec<(usize, f64)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.distance_to(&query)))
            .collect();

        if distances.len() < NEIGHBORS {
            let nearest = distances
                .iter()
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|&(i, _)| i)
                .unwrap_or(0);
            return Ok(values[nearest]);
        }

        // 稳定排序，距离相同时按下标先后
        distances.sort_by(|a, b| a.1.total_cmp(&b.1));
        distances.truncate(NEIGHBORS);

        let weight_sum: f64 = distances
            .iter()
            .map(|&(_, d)| 1.0 / (d + IDW_DISTANCE_EPS))
            .sum();
        Ok(distances
            .iter()
            .map(|&(i, d)| values[i] * (1.0 / (d + IDW_DISTANCE_EPS) / weight_sum))
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(5.0, 5.0),
        ]
    }

    #[test]
    fn test_center_of_square_is_mean() {
        let idw = NearestIdw::new(square());
        let z = idw.interpolate(0.5, 0.5, &[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        // 远处第五个点不参与
        assert!((z - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_on_sample_point() {
        let idw = NearestIdw::new(square());
        let z = idw.interpolate(1.0, 1.0, &[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert!((z - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_fallback() {
        let idw = NearestIdw::new(vec![Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0), Point2D::new(0.0, 10.0)]);
        assert_eq!(idw.interpolate(8.0, 1.0, &[1.0, 2.0, 3.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_errors() {
        let idw = NearestIdw::new(Vec::new());
        assert!(matches!(idw.interpolate(0.0, 0.0, &[]), Err(WeError::EmptyGrid)));

        let idw = NearestIdw::new(square());
        assert!(idw.interpolate(0.0, 0.0, &[1.0]).is_err());
    }
}

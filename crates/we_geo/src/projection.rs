// crates/we_geo/src/projection.rs

//! 本地平面投影
//!
//! 小区域内使用等距圆柱近似，将经纬度转换为以某原点为中心的平面坐标：
//!
//! - `x = Δlon · R · cos(φ̄)`，其中 φ̄ 为该点与原点纬度的平均值
//! - `y = Δlat · R`
//!
//! 逆变换以原点纬度近似 φ̄。

use crate::geometry::Point2D;
use we_foundation::EARTH_RADIUS;

/// 经纬度 → 本地平面坐标（米），x 向东，y 向北
pub fn lonlat_to_xy(lon: f64, lat: f64, origin_lon: f64, origin_lat: f64) -> (f64, f64) {
    let lat_rad = lat.to_radians();
    let origin_lat_rad = origin_lat.to_radians();

    let dlon = lon.to_radians() - origin_lon.to_radians();
    let dlat = lat_rad - origin_lat_rad;

    let avg_lat_rad = (lat_rad + origin_lat_rad) / 2.0;
    let x = dlon * EARTH_RADIUS * avg_lat_rad.cos();
    let y = dlat * EARTH_RADIUS;
    (x, y)
}

/// 本地平面坐标（米） → 经纬度
pub fn xy_to_lonlat(x: f64, y: f64, origin_lon: f64, origin_lat: f64) -> (f64, f64) {
    let origin_lon_rad = origin_lon.to_radians();
    let origin_lat_rad = origin_lat.to_radians();

    let dlon_rad = x / (EARTH_RADIUS * origin_lat_rad.cos());
    let dlat_rad = y / EARTH_RADIUS;

    (
        (origin_lon_rad + dlon_rad).to_degrees(),
        (origin_lat_rad + dlat_rad).to_degrees(),
    )
}

/// 等间距采样 `[start, stop]` 共 `n` 个点，末点精确等于 `stop`
///
/// `n == 1` 时只返回 `start`。
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            values[n - 1] = stop;
            values
        }
    }
}

/// 以固定原点为中心的本地投影
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    origin_lon: f64,
    origin_lat: f64,
}

impl LocalProjection {
    /// 以给定经纬度为原点创建投影
    pub fn new(origin_lon: f64, origin_lat: f64) -> Self {
        Self {
            origin_lon,
            origin_lat,
        }
    }

    /// 以一组经纬度点的算术平均为原点
    ///
    /// 点集为空时返回 `None`。
    pub fn centered_on<I>(lonlats: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut n = 0usize;
        let mut sum_lon = 0.0;
        let mut sum_lat = 0.0;
        for (lon, lat) in lonlats {
            sum_lon += lon;
            sum_lat += lat;
            n += 1;
        }
        (n > 0).then(|| Self::new(sum_lon / n as f64, sum_lat / n as f64))
    }

    /// 原点 (lon, lat)
    pub fn origin(&self) -> Point2D {
        Point2D::from_lonlat(self.origin_lon, self.origin_lat)
    }

    /// 正变换
    pub fn forward(&self, lon: f64, lat: f64) -> Point2D {
        let (x, y) = lonlat_to_xy(lon, lat, self.origin_lon, self.origin_lat);
        Point2D::new(x, y)
    }

    /// 逆变换，返回 (lon, lat)
    pub fn inverse(&self, p: Point2D) -> (f64, f64) {
        xy_to_lonlat(p.x, p.y, self.origin_lon, self.origin_lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_zero() {
        let (x, y) = lonlat_to_xy(120.0, 30.0, 120.0, 30.0);
        assert_eq!(x, 0.0);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn test_axes_orientation() {
        // 东、北为正
        let (x, y) = lonlat_to_xy(120.1, 30.1, 120.0, 30.0);
        assert!(x > 0.0);
        assert!(y > 0.0);

        // 0.1° 纬度约 11.1 km
        assert!((y - 11_119.5).abs() < 1.0);
    }

    #[test]
    fn test_inverse_close_to_forward() {
        let proj = LocalProjection::new(120.25, 30.25);
        let p = proj.forward(120.3, 30.2);
        let (lon, lat) = proj.inverse(p);
        // 逆变换用原点纬度近似，小区域内误差很小
        assert!((lon - 120.3).abs() < 1e-4);
        assert!((lat - 30.2).abs() < 1e-9);
    }

    #[test]
    fn test_linspace() {
        let v = linspace(120.0, 120.5, 11);
        assert_eq!(v.len(), 11);
        assert_eq!(v[0], 120.0);
        assert_eq!(v[10], 120.5);
        assert!((v[5] - 120.25).abs() < 1e-12);

        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
    }

    #[test]
    fn test_centered_on() {
        let proj = LocalProjection::centered_on(vec![(0.0, 0.0), (2.0, 4.0)]).unwrap();
        assert_eq!(proj.origin(), Point2D::new(1.0, 2.0));
        assert!(LocalProjection::centered_on(Vec::new()).is_none());
    }
}

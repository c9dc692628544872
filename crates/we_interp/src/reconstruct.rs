// crates/we_interp/src/reconstruct.rs

//! 由帧序列重建稠密网格
//!
//! 以第一帧的经纬度去重后组成规则网格（纬度外层、经度内层），水深取区域中间水深，
//! 本地坐标以区域中心为原点，与网格构建时一致。
//! 某帧缺少的网格点高度记为 0。

use std::collections::HashMap;

use tracing::debug;

use we_foundation::{WeError, WeResult};
use we_geo::LocalProjection;
use we_physics::{GridPoint, SimulationFrame, WaveGrid};

fn key(lon: f64, lat: f64) -> (u64, u64) {
    (lon.to_bits(), lat.to_bits())
}

fn sorted_unique(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

/// 帧序列 → 稠密网格
///
/// 帧时间必须严格递增。
pub fn frames_to_wave_grid<'a, I>(frames: I) -> WeResult<WaveGrid>
where
    I: IntoIterator<Item = &'a SimulationFrame>,
{
    let frames: Vec<&SimulationFrame> = frames.into_iter().collect();
    let Some(first) = frames.first() else {
        return Err(WeError::invalid_input("帧序列为空"));
    };

    let lons = sorted_unique(first.points.iter().map(|p| p.lon).collect());
    let lats = sorted_unique(first.points.iter().map(|p| p.lat).collect());

    let region = first.region;
    let (origin_lon, origin_lat) = region.centroid();
    let projection = LocalProjection::new(origin_lon, origin_lat);
    let depth = region.mid_depth();

    let mut grid_points = Vec::with_capacity(lons.len() * lats.len());
    let mut index = HashMap::with_capacity(lons.len() * lats.len());
    for &lat in &lats {
        for &lon in &lons {
            let p = projection.forward(lon, lat);
            index.insert(key(lon, lat), grid_points.len());
            grid_points.push(GridPoint {
                x: p.x,
                y: p.y,
                lon,
                lat,
                depth,
            });
        }
    }

    let times: Vec<f64> = frames.iter().map(|f| f.time).collect();
    let wave_heights: Vec<Vec<f64>> = frames
        .iter()
        .map(|frame| {
            let mut row = vec![0.0; grid_points.len()];
            for p in &frame.points {
                if let Some(&i) = index.get(&key(p.lon, p.lat)) {
                    row[i] = p.wave_height;
                }
            }
            row
        })
        .collect();

    debug!(
        "由 {} 帧重建网格: {} x {} 点",
        frames.len(),
        lons.len(),
        lats.len()
    );
    WaveGrid::new(grid_points, times, wave_heights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use we_config::Region;
    use we_physics::WavePoint;

    fn frame(time: f64, heights: [f64; 4]) -> SimulationFrame {
        let coords = [(1.0, 0.0), (0.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        SimulationFrame {
            time,
            region: Region::new(0.0, 0.0, 1.0, 1.0).with_depth(10.0, 30.0),
            points: coords
                .iter()
                .zip(heights)
                .map(|(&(lon, lat), wave_height)| WavePoint {
                    lon,
                    lat,
                    wave_height,
                })
                .collect(),
        }
    }

    #[test]
    fn test_reorders_lat_major() {
        let frames = vec![frame(0.0, [1.0, 2.0, 3.0, 4.0])];
        let grid = frames_to_wave_grid(&frames).unwrap();

        let order: Vec<(f64, f64)> = grid.grid_points.iter().map(|p| (p.lon, p.lat)).collect();
        assert_eq!(order, vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
        assert_eq!(grid.wave_heights[0], vec![2.0, 1.0, 4.0, 3.0]);
        assert!(grid.grid_points.iter().all(|p| p.depth == 20.0));
    }

    #[test]
    fn test_missing_points_are_zero() {
        let mut second = frame(0.2, [5.0, 6.0, 7.0, 8.0]);
        second.points.truncate(2);
        let frames = vec![frame(0.0, [1.0, 2.0, 3.0, 4.0]), second];
        let grid = frames_to_wave_grid(&frames).unwrap();
        assert_eq!(grid.times, vec![0.0, 0.2]);
        assert_eq!(grid.wave_heights[1], vec![6.0, 5.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_frames() {
        let frames: Vec<SimulationFrame> = Vec::new();
        assert!(frames_to_wave_grid(&frames).is_err());
    }
}

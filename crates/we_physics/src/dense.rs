// crates/we_physics/src/dense.rs

//! 批量模拟
//!
//! 对有限时长的请求一次性算出全部时刻，结果保存为 (时间 × 网格点) 矩阵。

use serde::{Deserialize, Serialize};
use tracing::info;

use we_config::{Region, SimulationRequest};
use we_foundation::{WeError, WeResult};

use crate::evaluator::WaveFieldEvaluator;
use crate::frame::SimulationFrame;
use crate::grid::{GridBuilder, GridPoint};
use crate::scheduler::ComputePool;
use crate::spectrum::SpectrumGenerator;
use crate::wind::WindField;

/// 稠密波面时间序列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveGrid {
    /// 网格点
    pub grid_points: Vec<GridPoint>,
    /// 采样时刻，严格递增
    pub times: Vec<f64>,
    /// `wave_heights[i][j]` 为第 i 个时刻第 j 个点的高度
    pub wave_heights: Vec<Vec<f64>>,
}

impl WaveGrid {
    /// 创建并检查维度
    pub fn new(
        grid_points: Vec<GridPoint>,
        times: Vec<f64>,
        wave_heights: Vec<Vec<f64>>,
    ) -> WeResult<Self> {
        if grid_points.is_empty() {
            return Err(WeError::EmptyGrid);
        }
        if times.is_empty() {
            return Err(WeError::invalid_input("时间序列为空"));
        }
        WeError::check_size("wave_heights", times.len(), wave_heights.len())?;
        for row in &wave_heights {
            WeError::check_size("wave_heights row", grid_points.len(), row.len())?;
        }
        if times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(WeError::invalid_input("采样时刻必须严格递增"));
        }
        Ok(Self {
            grid_points,
            times,
            wave_heights,
        })
    }

    /// 时刻数
    pub fn num_times(&self) -> usize {
        self.times.len()
    }

    /// 网格点数
    pub fn num_points(&self) -> usize {
        self.grid_points.len()
    }

    /// 最接近 `time` 的时刻下标
    pub fn nearest_time_index(&self, time: f64) -> usize {
        self.times
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1 - time).abs().total_cmp(&(b.1 - time).abs()))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// 最接近 `time` 的时刻的全场高度
    pub fn height_at_time(&self, time: f64) -> &[f64] {
        &self.wave_heights[self.nearest_time_index(time)]
    }

    /// 某个点的高度时间序列
    pub fn height_series_at_point(&self, point_idx: usize) -> Option<Vec<f64>> {
        (point_idx < self.num_points())
            .then(|| self.wave_heights.iter().map(|row| row[point_idx]).collect())
    }

    /// 第 `time_idx` 个时刻组装成帧
    pub fn frame_at(&self, time_idx: usize, region: Region) -> Option<SimulationFrame> {
        let heights = self.wave_heights.get(time_idx)?;
        Some(SimulationFrame::from_heights(
            self.times[time_idx],
            region,
            &self.grid_points,
            heights,
        ))
    }

    /// 全部时刻的帧
    pub fn to_frames(&self, region: Region) -> Vec<SimulationFrame> {
        (0..self.num_times())
            .filter_map(|i| self.frame_at(i, region))
            .collect()
    }
}

/// 采样时刻 `0, dt, 2dt, …`，覆盖到 `t_total`（含端点）
pub fn sample_times(dt: f64, t_total: f64) -> Vec<f64> {
    let stop = t_total + dt / 2.0;
    let n = (stop / dt).ceil().max(0.0) as usize;
    (0..n).map(|i| i as f64 * dt).collect()
}

/// 批量模拟有限时长的请求
pub fn simulate_dense(request: &SimulationRequest, pool: &ComputePool) -> WeResult<WaveGrid> {
    let Some(t_total) = request.time.time_limit() else {
        return Err(WeError::invalid_input("批量模拟需要有限的 T_total"));
    };
    let dt = request.time.dt_backend;

    let grid = GridBuilder::new(&request.region, &request.discretization).build()?;
    let wind = WindField::from(&request.wind);
    let spectrum = SpectrumGenerator::new(&wind, &request.spectrum).generate()?;
    let evaluator = WaveFieldEvaluator::new(&spectrum, &grid);
    let times = sample_times(dt, t_total);

    let wave_heights = pool.install(|| -> WeResult<Vec<Vec<f64>>> {
        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(times.len());
        rows.push(evaluator.evaluate(0.0));
        for window in times.windows(2) {
            let previous = rows.last().map(Vec::as_slice).unwrap_or_default();
            let next = evaluator.advance(previous, dt, window[0])?;
            rows.push(next);
        }
        Ok(rows)
    })?;

    info!(
        "批量模拟完成: {} 个时刻 x {} 点",
        times.len(),
        grid.len()
    );
    WaveGrid::new(grid, times, wave_heights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_times_inclusive() {
        let times = sample_times(0.2, 1.0);
        assert_eq!(times.len(), 6);
        assert!((times[5] - 1.0).abs() < 1e-12);

        assert_eq!(sample_times(0.5, 0.1), vec![0.0]);
    }

    #[test]
    fn test_wave_grid_accessors() {
        let point = GridPoint {
            x: 0.0,
            y: 0.0,
            lon: 1.0,
            lat: 2.0,
            depth: 10.0,
        };
        let grid = WaveGrid::new(
            vec![point, point],
            vec![0.0, 1.0],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();

        assert_eq!(grid.height_at_time(0.9), &[3.0, 4.0]);
        assert_eq!(grid.height_series_at_point(1), Some(vec![2.0, 4.0]));
        assert_eq!(grid.height_series_at_point(2), None);

        let frame = grid.frame_at(1, Region::new(0.0, 0.0, 2.0, 3.0)).unwrap();
        assert_eq!(frame.time, 1.0);
        assert_eq!(frame.points[0].wave_height, 3.0);
    }

    #[test]
    fn test_wave_grid_shape_checked() {
        let point = GridPoint {
            x: 0.0,
            y: 0.0,
            lon: 0.0,
            lat: 0.0,
            depth: 0.0,
        };
        assert!(WaveGrid::new(vec![point], vec![0.0], vec![vec![1.0, 2.0]]).is_err());
        assert!(WaveGrid::new(vec![point], vec![1.0, 0.0], vec![vec![1.0], vec![2.0]]).is_err());
        assert!(matches!(
            WaveGrid::new(Vec::new(), vec![0.0], vec![Vec::new()]),
            Err(WeError::EmptyGrid)
        ));
    }
}

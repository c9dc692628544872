// crates/we_physics/src/frame.rs

//! 模拟帧

use serde::{Deserialize, Serialize};
use we_config::Region;

use crate::grid::GridPoint;

/// 某一时刻某一点的波面高度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WavePoint {
    /// 经度 [度]
    pub lon: f64,
    /// 纬度 [度]
    pub lat: f64,
    /// 波面高度 [m]
    pub wave_height: f64,
}

/// 某一时刻的区域波面场，生成后只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationFrame {
    /// 相对 t=0 的时间 [s]
    pub time: f64,
    /// 所属区域
    pub region: Region,
    /// 各网格点高度，顺序与网格一致
    pub points: Vec<WavePoint>,
}

impl SimulationFrame {
    /// 由网格与高度数组组装
    pub fn from_heights(time: f64, region: Region, grid: &[GridPoint], heights: &[f64]) -> Self {
        let points = grid
            .iter()
            .zip(heights)
            .map(|(p, &h)| WavePoint {
                lon: p.lon,
                lat: p.lat,
                wave_height: h,
            })
            .collect();
        Self {
            time,
            region,
            points,
        }
    }

    /// 点数
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 是否为空帧
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 最大波面高度绝对值
    pub fn max_abs_height(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.wave_height.abs())
            .fold(0.0, f64::max)
    }
}

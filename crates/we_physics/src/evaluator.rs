// crates/we_physics/src/evaluator.rs

//! 波面场求值
//!
//! ```text
//! η(x, y, t) = Σ Aᵢ·cos(kxᵢ·x + kyᵢ·y − ωᵢ·t + φᵢ)
//! ```
//!
//! 求值对时间无状态。`advance` 是步进接口，结果与直接在 `t + dt` 求值逐位一致。
//! 点间并行，每点内按成分顺序累加，因此结果与线程数无关。

use rayon::prelude::*;

use we_foundation::{WeError, WeResult};

use crate::grid::GridPoint;
use crate::spectrum::WaveSpectrum;

/// 预展开的波成分
#[derive(Debug, Clone, Copy)]
struct Term {
    kx: f64,
    ky: f64,
    omega: f64,
    amplitude: f64,
    phase: f64,
}

/// 波面场求值器
#[derive(Debug, Clone)]
pub struct WaveFieldEvaluator {
    terms: Vec<Term>,
    coords: Vec<(f64, f64)>,
}

impl WaveFieldEvaluator {
    /// 由波浪谱与网格创建
    pub fn new(spectrum: &WaveSpectrum, grid: &[GridPoint]) -> Self {
        let terms = spectrum
            .components
            .iter()
            .map(|c| {
                let (kx, ky) = c.wave_vector();
                Term {
                    kx,
                    ky,
                    omega: c.angular_frequency(),
                    amplitude: c.amplitude,
                    phase: c.phase,
                }
            })
            .collect();
        let coords = grid.iter().map(|p| (p.x, p.y)).collect();
        Self { terms, coords }
    }

    /// 网格点数
    pub fn num_points(&self) -> usize {
        self.coords.len()
    }

    /// 波成分数
    pub fn num_components(&self) -> usize {
        self.terms.len()
    }

    /// 时刻 `t` 的波面高度
    pub fn evaluate(&self, t: f64) -> Vec<f64> {
        self.coords
            .par_iter()
            .map(|&(x, y)| self.height_at(x, y, t))
            .collect()
    }

    /// 由 `current_time` 时刻的高度推进 `dt`
    pub fn advance(&self, current: &[f64], dt: f64, current_time: f64) -> WeResult<Vec<f64>> {
        WeError::check_size("wave_height", self.coords.len(), current.len())?;
        Ok(self.evaluate(current_time + dt))
    }

    /// 任意本地坐标处的高度
    #[inline]
    pub fn height_at(&self, x: f64, y: f64, t: f64) -> f64 {
        let mut eta = 0.0;
        for term in &self.terms {
            eta += term.amplitude * (term.kx * x + term.ky * y - term.omega * t + term.phase).cos();
        }
        eta
    }
}

// crates/we_physics/src/spectrum.rs

//! 方向波浪谱
//!
//! Pierson-Moskowitz 谱：
//!
//! ```text
//! S(ω) = α·g²/ω⁵ · exp(−β·(ωₚ/ω)⁴),  α = 0.0081, β = 0.74, ωₚ = 2π/Tp
//! ```
//!
//! 频率在 [0.1, 2.0] Hz 上取 50 个点，方向在 `主浪向 ± spread/2` 上取 16 个点，
//! 方向分布为 cos²。每个 (频率, 方向) 组合的振幅为 `sqrt(2·S·D·Δf·Δθ)`，
//! 振幅不超过 [`AMPLITUDE_CUTOFF`] 的成分被丢弃。
//!
//! 相位是整个引擎唯一的随机来源，由调用方通过 `rand::Rng` 注入。

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use we_config::{SpectrumConfig, SpectrumModel};
use we_foundation::tolerance::AMPLITUDE_CUTOFF;
use we_foundation::{WeError, WeResult, GRAVITY};
use we_geo::linspace;

use crate::wind::WindField;

/// PM 谱 Phillips 常数
pub const PM_ALPHA: f64 = 0.0081;
/// PM 谱形状参数
pub const PM_BETA: f64 = 0.74;

const FREQ_MIN: f64 = 0.1;
const FREQ_MAX: f64 = 2.0;
const N_FREQ: usize = 50;
const N_DIR: usize = 16;

/// 单个波成分
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveComponent {
    /// 频率 [Hz]
    pub frequency: f64,
    /// 波向 [度]
    pub direction_deg: f64,
    /// 振幅 [m]
    pub amplitude: f64,
    /// 相位 [rad]
    pub phase: f64,
    /// 深水波数 k = ω²/g [1/m]
    pub wave_number: f64,
}

impl WaveComponent {
    /// 角频率 ω = 2πf
    #[inline]
    pub fn angular_frequency(&self) -> f64 {
        2.0 * PI * self.frequency
    }

    /// 波数矢量 (kx, ky)
    #[inline]
    pub fn wave_vector(&self) -> (f64, f64) {
        let dir_rad = self.direction_deg.to_radians();
        (
            self.wave_number * dir_rad.sin(),
            self.wave_number * dir_rad.cos(),
        )
    }
}

/// 离散方向波浪谱，生成后在整个模拟期间只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveSpectrum {
    /// 波成分
    pub components: Vec<WaveComponent>,
    /// 有效波高 [m]
    pub hs: f64,
    /// 峰值周期 [s]
    pub tp: f64,
    /// 主浪向 [度]
    pub main_direction_deg: f64,
}

impl WaveSpectrum {
    /// 成分数
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// 是否无成分
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// 原点 t=0 处的水面高度 ΣA·cos(φ)
    pub fn height_at_origin(&self) -> f64 {
        self.components
            .iter()
            .map(|c| c.amplitude * c.phase.cos())
            .sum()
    }
}

/// PM 谱密度 S(ω) [m²·s]
pub fn pm_density(omega: f64, tp: f64) -> f64 {
    if omega <= 0.0 {
        return 0.0;
    }
    let omega_p = 2.0 * PI / tp;
    PM_ALPHA * GRAVITY * GRAVITY / omega.powi(5) * (-PM_BETA * (omega_p / omega).powi(4)).exp()
}

/// 波浪谱生成器
#[derive(Debug, Clone, Copy)]
pub struct SpectrumGenerator<'a> {
    wind: &'a WindField,
    config: &'a SpectrumConfig,
}

impl<'a> SpectrumGenerator<'a> {
    /// 由风场与谱配置创建
    pub fn new(wind: &'a WindField, config: &'a SpectrumConfig) -> Self {
        Self { wind, config }
    }

    /// 使用配置中的种子生成，未配置种子时使用线程随机源
    pub fn generate(&self) -> WeResult<WaveSpectrum> {
        match self.config.seed {
            Some(seed) => self.generate_with(&mut StdRng::seed_from_u64(seed)),
            None => self.generate_with(&mut rand::thread_rng()),
        }
    }

    /// 使用给定随机源生成
    pub fn generate_with<R: Rng>(&self, rng: &mut R) -> WeResult<WaveSpectrum> {
        match self.config.spectrum_model_type {
            SpectrumModel::PiersonMoskowitz => Ok(self.pierson_moskowitz(rng)),
            other => Err(WeError::unsupported_model(
                other.id(),
                &[SpectrumModel::PiersonMoskowitz.id()],
            )),
        }
    }

    /// 主浪向：显式配置优先，否则取风向
    pub fn main_direction(&self) -> f64 {
        self.config
            .main_wave_direction_deg
            .unwrap_or(self.wind.wind_direction_deg)
    }

    fn pierson_moskowitz<R: Rng>(&self, rng: &mut R) -> WaveSpectrum {
        let main_direction = self.main_direction();
        let spread = self.config.directional_spread_deg;
        let half_spread = spread / 2.0;

        let frequencies = linspace(FREQ_MIN, FREQ_MAX, N_FREQ);
        let df = frequencies[1] - frequencies[0];
        let directions = linspace(main_direction - half_spread, main_direction + half_spread, N_DIR);
        let d_theta = spread / N_DIR as f64;

        let mut components = Vec::new();
        for &freq in &frequencies {
            let omega = 2.0 * PI * freq;
            let s = pm_density(omega, self.config.tp);

            for &direction_deg in &directions {
                let angle_diff = (direction_deg - main_direction).abs();
                if angle_diff > half_spread {
                    continue;
                }
                let dir_weight = angle_diff.to_radians().cos().powi(2);

                let energy = s * dir_weight * df * d_theta;
                let amplitude = if energy > 0.0 { (2.0 * energy).sqrt() } else { 0.0 };
                if amplitude <= AMPLITUDE_CUTOFF {
                    continue;
                }

                components.push(WaveComponent {
                    frequency: freq,
                    direction_deg,
                    amplitude,
                    phase: rng.gen_range(0.0..2.0 * PI),
                    wave_number: omega * omega / GRAVITY,
                });
            }
        }

        debug!(
            "PM 谱生成完成: {} 个成分, 主浪向 {:.1}°",
            components.len(),
            main_direction
        );

        WaveSpectrum {
            components,
            hs: self.config.hs,
            tp: self.config.tp,
            main_direction_deg: main_direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wind() -> WindField {
        WindField::new(10.0, 270.0, 10.0)
    }

    #[test]
    fn test_pm_density_peak() {
        let tp = 8.0;
        let omega_p = 2.0 * PI / tp;
        assert!(pm_density(omega_p, tp) > pm_density(4.0 * omega_p, tp));
        assert!(pm_density(omega_p, tp) > pm_density(0.5 * omega_p, tp));
        assert_eq!(pm_density(0.0, tp), 0.0);
    }

    #[test]
    fn test_components_valid() {
        let wind = wind();
        let config = SpectrumConfig::default().with_seed(1);
        let spectrum = SpectrumGenerator::new(&wind, &config).generate().unwrap();

        assert!(!spectrum.is_empty());
        assert!(spectrum.len() <= N_FREQ * N_DIR);
        for c in &spectrum.components {
            assert!(c.amplitude > AMPLITUDE_CUTOFF);
            assert!((0.0..2.0 * PI).contains(&c.phase));
            assert!((c.direction_deg - 270.0).abs() <= 15.0 + 1e-9);
            let omega = c.angular_frequency();
            assert!((c.wave_number - omega * omega / GRAVITY).abs() < 1e-12);
        }
    }

    #[test]
    fn test_main_direction_default_and_override() {
        let wind = wind();
        let config = SpectrumConfig::default();
        assert_eq!(SpectrumGenerator::new(&wind, &config).main_direction(), 270.0);

        let config = SpectrumConfig {
            main_wave_direction_deg: Some(45.0),
            ..Default::default()
        };
        assert_eq!(SpectrumGenerator::new(&wind, &config).main_direction(), 45.0);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let wind = wind();
        let config = SpectrumConfig::default().with_seed(42);
        let a = SpectrumGenerator::new(&wind, &config).generate().unwrap();
        let b = SpectrumGenerator::new(&wind, &config).generate().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_jonswap_unsupported() {
        let wind = wind();
        let config = SpectrumConfig {
            spectrum_model_type: SpectrumModel::Jonswap,
            ..Default::default()
        };
        let err = SpectrumGenerator::new(&wind, &config).generate().unwrap_err();
        assert!(matches!(err, WeError::UnsupportedModel { .. }));
    }

    #[test]
    fn test_wave_vector_direction() {
        let c = WaveComponent {
            frequency: 0.2,
            direction_deg: 90.0,
            amplitude: 1.0,
            phase: 0.0,
            wave_number: 0.5,
        };
        let (kx, ky) = c.wave_vector();
        assert!((kx - 0.5).abs() < 1e-12);
        assert!(ky.abs() < 1e-12);
    }

    #[test]
    fn test_spectrum_json_restores_field() {
        let wind = wind();
        let config = SpectrumConfig::default().with_seed(9);
        let spectrum = SpectrumGenerator::new(&wind, &config).generate().unwrap();

        let json = serde_json::to_string(&spectrum).unwrap();
        let restored: WaveSpectrum = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.len(), spectrum.len());
        assert_eq!(restored.main_direction_deg, spectrum.main_direction_deg);
        assert!((restored.height_at_origin() - spectrum.height_at_origin()).abs() < 1e-9);
    }
}

// crates/we_interp/src/temporal.rs

//! 时间插值
//!
//! # 示例
//!
//! ```
//! use we_interp::temporal::TemporalInterpolator;
//!
//! let interp = TemporalInterpolator::linear();
//! let v = interp.interpolate_scalar(0.5, 0.0, 1.0, 10.0, 20.0);
//! assert!((v - 15.0).abs() < 1e-10);
//! ```

use std::borrow::Cow;

use we_foundation::tolerance::{same_instant, INTERVAL_EPS};
use we_foundation::{WeError, WeResult};

/// 线性时间插值器
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalInterpolator;

impl TemporalInterpolator {
    /// 线性插值器
    pub fn linear() -> Self {
        Self
    }

    /// 标量插值，区间退化时返回 `v0`
    #[inline]
    pub fn interpolate_scalar(&self, t: f64, t0: f64, t1: f64, v0: f64, v1: f64) -> f64 {
        let dt = t1 - t0;
        if dt.abs() < INTERVAL_EPS {
            v0
        } else {
            v0 + (t - t0) / dt * (v1 - v0)
        }
    }

    /// 批量插值
    pub fn interpolate_batch(
        &self,
        t: f64,
        t0: f64,
        t1: f64,
        v0: &[f64],
        v1: &[f64],
    ) -> WeResult<Vec<f64>> {
        WeError::check_size("temporal interpolation", v0.len(), v1.len())?;
        Ok(v0
            .iter()
            .zip(v1)
            .map(|(&a, &b)| self.interpolate_scalar(t, t0, t1, a, b))
            .collect())
    }
}

/// 在 (时间 × 点) 矩阵上按时间取行
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesSampler<'a> {
    times: &'a [f64],
    rows: &'a [Vec<f64>],
    interpolator: TemporalInterpolator,
}

impl<'a> TimeSeriesSampler<'a> {
    /// 创建采样器，`times` 必须非空且与 `rows` 等长
    pub fn new(times: &'a [f64], rows: &'a [Vec<f64>]) -> WeResult<Self> {
        if times.is_empty() {
            return Err(WeError::invalid_input("时间序列为空"));
        }
        WeError::check_size("time rows", times.len(), rows.len())?;
        Ok(Self {
            times,
            rows,
            interpolator: TemporalInterpolator::linear(),
        })
    }

    /// 时刻 `t` 的全场值
    ///
    /// 查询时刻先夹到采样范围内；与采样时刻相差小于 1e-6 s 时直接返回该行，
    /// 否则在前后两行之间线性插值。
    pub fn sample(&self, t: f64) -> WeResult<Cow<'a, [f64]>> {
        let first = self.times[0];
        let last = self.times[self.times.len() - 1];
        let t = t.clamp(first, last);

        // 第一个不小于 t 的下标
        let idx = self.times.partition_point(|&s| s < t);
        if idx < self.times.len() && same_instant(self.times[idx], t) {
            return Ok(Cow::Borrowed(&self.rows[idx]));
        }
        if idx == 0 {
            return Ok(Cow::Borrowed(&self.rows[0]));
        }
        if idx >= self.times.len() {
            return Ok(Cow::Borrowed(&self.rows[self.times.len() - 1]));
        }

        let values = self.interpolator.interpolate_batch(
            t,
            self.times[idx - 1],
            self.times[idx],
            &self.rows[idx - 1],
            &self.rows[idx],
        )?;
        Ok(Cow::Owned(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> (Vec<f64>, Vec<Vec<f64>>) {
        (
            vec![0.0, 1.0, 2.0],
            vec![vec![0.0, 10.0], vec![2.0, 20.0], vec![4.0, 0.0]],
        )
    }

    #[test]
    fn test_scalar_degenerate_interval() {
        let interp = TemporalInterpolator::linear();
        assert_eq!(interp.interpolate_scalar(1.0, 1.0, 1.0, 5.0, 9.0), 5.0);
    }

    #[test]
    fn test_batch_size_mismatch() {
        let interp = TemporalInterpolator::linear();
        assert!(interp.interpolate_batch(0.5, 0.0, 1.0, &[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_sample_exact_and_between() {
        let (times, rows) = series();
        let sampler = TimeSeriesSampler::new(&times, &rows).unwrap();

        assert_eq!(&*sampler.sample(1.0).unwrap(), &[2.0, 20.0]);
        assert_eq!(&*sampler.sample(1.0 - 1e-8).unwrap(), &[2.0, 20.0]);

        let mid = sampler.sample(1.5).unwrap();
        assert!((mid[0] - 3.0).abs() < 1e-12);
        assert!((mid[1] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_clamped() {
        let (times, rows) = series();
        let sampler = TimeSeriesSampler::new(&times, &rows).unwrap();
        assert_eq!(&*sampler.sample(-5.0).unwrap(), &[0.0, 10.0]);
        assert_eq!(&*sampler.sample(99.0).unwrap(), &[4.0, 0.0]);
    }

    #[test]
    fn test_sampler_rejects_empty() {
        assert!(TimeSeriesSampler::new(&[], &[]).is_err());
    }
}

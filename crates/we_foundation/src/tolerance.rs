// crates/we_foundation/src/tolerance.rs

//! 数值容差与物理常数
//!
//! 全部为编译期常量，供物理层、插值层与工作流层共享。

/// 重力加速度 [m/s²]
pub const GRAVITY: f64 = 9.81;

/// 地球半径 [m]（等距圆柱近似使用的球半径）
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// 时间上限判断容差 [s]，吸收 `t += dt` 的浮点累积误差
pub const TIME_LIMIT_EPS: f64 = 1e-9;

/// 采样时刻匹配容差 [s]
pub const TIME_MATCH_EPS: f64 = 1e-6;

/// 线性插值退化区间容差 [s]
pub const INTERVAL_EPS: f64 = 1e-10;

/// 反距离权重的距离偏置 [m]
pub const IDW_DISTANCE_EPS: f64 = 1e-10;

/// 波成分振幅下限 [m]，低于此值的成分被丢弃
pub const AMPLITUDE_CUTOFF: f64 = 1e-6;

/// 判断时间 `t` 是否超过上限 `limit`（含容差）
#[inline]
pub fn exceeds_limit(t: f64, limit: f64) -> bool {
    t > limit + TIME_LIMIT_EPS
}

/// 判断时间 `t` 是否已到达上限 `limit`（含容差）
#[inline]
pub fn reaches_limit(t: f64, limit: f64) -> bool {
    t >= limit - TIME_LIMIT_EPS
}

/// 两个采样时刻是否视为同一时刻
#[inline]
pub fn same_instant(a: f64, b: f64) -> bool {
    (a - b).abs() < TIME_MATCH_EPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_tolerance() {
        // 0.1 累加 10 次不等于 1.0，但应视为到达上限
        let t: f64 = (0..10).map(|_| 0.1).sum();
        assert!(reaches_limit(t, 1.0));
        assert!(!exceeds_limit(t, 1.0));
        assert!(exceeds_limit(1.1, 1.0));
    }

    #[test]
    fn test_same_instant() {
        assert!(same_instant(0.6, 0.6 + 1e-9));
        assert!(!same_instant(0.6, 0.6001));
    }
}

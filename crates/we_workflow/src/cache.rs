// crates/we_workflow/src/cache.rs

//! 帧缓存
//!
//! 按时间严格递增追加的帧序列。配置保留时长 `R` 后，每次在时刻 `T` 追加帧时
//! 从队首淘汰所有 `time < T - R` 的帧，但最新一帧永远保留。
//! 未配置保留时长时帧无限累积。
//!
//! 帧以 `Arc` 保存，追加只是一次指针入队，读者拿到的永远是完整的帧。

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::trace;

use we_foundation::{WeError, WeResult};
use we_physics::SimulationFrame;

/// 区间查询默认返回的最大帧数
pub const DEFAULT_MAX_FRAMES: usize = 100;

/// 保留窗口 `[end - retention, end]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetentionWindow {
    /// 窗口起点 [s]
    pub start: f64,
    /// 窗口终点（最新时刻）[s]
    pub end: f64,
    /// 保留时长 [s]
    pub retention: f64,
}

impl RetentionWindow {
    /// 以最新时刻与保留时长构造
    pub fn new(latest_time: f64, retention: f64) -> Self {
        Self {
            start: latest_time - retention,
            end: latest_time,
            retention,
        }
    }

    /// `time` 是否早于窗口起点（已被淘汰）
    pub fn is_expired(&self, time: f64) -> bool {
        time < self.start
    }
}

/// 在 `[0, n-1]` 上均匀取 `m` 个下标（向下取整）
///
/// `n <= m` 时返回全部下标。
pub fn subsample_indices(n: usize, m: usize) -> Vec<usize> {
    if n <= m {
        return (0..n).collect();
    }
    match m {
        0 => Vec::new(),
        1 => vec![0],
        _ => {
            let step = (n - 1) as f64 / (m - 1) as f64;
            (0..m).map(|i| (i as f64 * step).floor() as usize).collect()
        }
    }
}

/// 带保留窗口的帧缓存
#[derive(Debug, Clone, Default)]
pub struct FrameCache {
    frames: VecDeque<Arc<SimulationFrame>>,
    retention: Option<f64>,
}

impl FrameCache {
    /// 创建缓存，`retention` 为 `None` 时不淘汰
    pub fn new(retention: Option<f64>) -> Self {
        Self {
            frames: VecDeque::new(),
            retention,
        }
    }

    /// 保留时长
    pub fn retention(&self) -> Option<f64> {
        self.retention
    }

    /// 追加一帧并执行淘汰，返回淘汰的帧数
    ///
    /// 帧时间必须大于当前最新帧，否则拒绝追加。
    pub fn push(&mut self, frame: Arc<SimulationFrame>) -> WeResult<usize> {
        if let Some(latest) = self.latest_time() {
            if frame.time <= latest {
                return Err(WeError::invalid_input(format!(
                    "帧时间必须严格递增: 最新 {} s, 追加 {} s",
                    latest, frame.time
                )));
            }
        }

        let time = frame.time;
        self.frames.push_back(frame);

        let mut evicted = 0;
        if let Some(retention) = self.retention {
            let cutoff = time - retention;
            while self.frames.len() > 1 && self.frames.front().is_some_and(|f| f.time < cutoff) {
                self.frames.pop_front();
                evicted += 1;
            }
        }
        if evicted > 0 {
            trace!("t={} 淘汰 {} 帧", time, evicted);
        }
        Ok(evicted)
    }

    /// 最新帧
    pub fn latest(&self) -> Option<&Arc<SimulationFrame>> {
        self.frames.back()
    }

    /// 最新帧时间
    pub fn latest_time(&self) -> Option<f64> {
        self.frames.back().map(|f| f.time)
    }

    /// 当前保留窗口，未配置保留时长或缓存为空时为 `None`
    pub fn window(&self) -> Option<RetentionWindow> {
        let retention = self.retention?;
        self.latest_time()
            .map(|latest| RetentionWindow::new(latest, retention))
    }

    /// 与 `time` 时间差最小的帧，相同差值取较早的一帧
    pub fn nearest(&self, time: f64) -> Option<&Arc<SimulationFrame>> {
        let mut best: Option<(&Arc<SimulationFrame>, f64)> = None;
        for frame in &self.frames {
            let diff = (frame.time - time).abs();
            if best.map_or(true, |(_, d)| diff < d) {
                best = Some((frame, diff));
            }
        }
        best.map(|(frame, _)| frame)
    }

    /// 时间区间内的帧，超过 `max_frames` 时按下标均匀抽样
    pub fn range(
        &self,
        time_min: Option<f64>,
        time_max: Option<f64>,
        max_frames: usize,
    ) -> Vec<Arc<SimulationFrame>> {
        let filtered: Vec<&Arc<SimulationFrame>> = self
            .frames
            .iter()
            .filter(|f| time_min.map_or(true, |t| f.time >= t))
            .filter(|f| time_max.map_or(true, |t| f.time <= t))
            .collect();
        subsample_indices(filtered.len(), max_frames)
            .into_iter()
            .map(|i| Arc::clone(filtered[i]))
            .collect()
    }

    /// 全部帧的快照
    pub fn snapshot(&self) -> Vec<Arc<SimulationFrame>> {
        self.frames.iter().cloned().collect()
    }

    /// 帧时间序列
    pub fn times(&self) -> Vec<f64> {
        self.frames.iter().map(|f| f.time).collect()
    }

    /// 清空
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// 帧数
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use we_config::Region;

    fn frame(time: f64) -> Arc<SimulationFrame> {
        Arc::new(SimulationFrame {
            time,
            region: Region::new(0.0, 0.0, 1.0, 1.0),
            points: Vec::new(),
        })
    }

    fn filled(retention: Option<f64>, n: usize, dt: f64) -> FrameCache {
        let mut cache = FrameCache::new(retention);
        for i in 0..n {
            cache.push(frame(i as f64 * dt)).unwrap();
        }
        cache
    }

    #[test]
    fn test_retention_eviction() {
        let cache = filled(Some(1.0), 16, 0.25);
        let latest = cache.latest_time().unwrap();
        assert_eq!(latest, 3.75);
        assert!(cache.times().iter().all(|&t| t >= latest - 1.0));
        // 2.75 ~ 3.75 共 5 帧
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn test_latest_never_evicted() {
        let mut cache = FrameCache::new(Some(1e-6));
        cache.push(frame(0.0)).unwrap();
        let evicted = cache.push(frame(5.0)).unwrap();
        assert_eq!(evicted, 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.latest_time(), Some(5.0));
    }

    #[test]
    fn test_unbounded_without_retention() {
        let cache = filled(None, 50, 0.2);
        assert_eq!(cache.len(), 50);
        assert!(cache.window().is_none());
    }

    #[test]
    fn test_rejects_non_increasing() {
        let mut cache = filled(None, 3, 0.2);
        assert!(cache.push(frame(0.4)).is_err());
        assert!(cache.push(frame(0.1)).is_err());
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_nearest() {
        let cache = filled(None, 5, 0.2);
        assert_eq!(cache.nearest(0.33).unwrap().time, 0.4);
        assert_eq!(cache.nearest(-3.0).unwrap().time, 0.0);
        assert_eq!(cache.nearest(99.0).unwrap().time, 0.8);
        // 等距时取较早的一帧
        assert_eq!(cache.nearest(0.1).unwrap().time, 0.0);
        assert!(FrameCache::new(None).nearest(0.0).is_none());
    }

    #[test]
    fn test_range_filter_and_subsample() {
        let cache = filled(None, 11, 1.0);
        let times: Vec<f64> = cache.range(Some(2.0), Some(5.0), 100).iter().map(|f| f.time).collect();
        assert_eq!(times, vec![2.0, 3.0, 4.0, 5.0]);

        let times: Vec<f64> = cache.range(None, None, 3).iter().map(|f| f.time).collect();
        assert_eq!(times, vec![0.0, 5.0, 10.0]);

        assert!(cache.range(Some(20.0), None, 10).is_empty());
    }

    #[test]
    fn test_subsample_indices() {
        assert_eq!(subsample_indices(3, 5), vec![0, 1, 2]);
        assert_eq!(subsample_indices(10, 4), vec![0, 3, 6, 9]);
        assert_eq!(subsample_indices(10, 1), vec![0]);
        assert!(subsample_indices(10, 0).is_empty());
    }

    #[test]
    fn test_window() {
        let cache = filled(Some(1.0), 16, 0.2);
        let window = cache.window().unwrap();
        assert!(window.is_expired(window.end - 1.5));
        assert!(!window.is_expired(window.end - 0.5));
    }
}

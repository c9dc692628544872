// crates/we_physics/src/scheduler.rs

//! 计算线程池
//!
//! 所有任务共享一个 rayon 线程池：波面求值在池内按网格点并行，
//! 步进器的预计算也投递到同一个池中执行。

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::error;

use we_foundation::{WeError, WeResult};

const HISTORY_LIMIT: usize = 1000;

/// 性能记录
#[derive(Debug, Clone)]
struct PerformanceRecord {
    num_points: usize,
    elapsed_secs: f64,
    _timestamp: Instant,
}

/// 性能统计
#[derive(Debug, Clone, Default)]
pub struct PerformanceStats {
    /// 求值次数
    pub invocations: usize,
    /// 平均吞吐量 (点/秒)
    pub avg_points_per_sec: f64,
}

/// 共享计算线程池
#[derive(Clone)]
pub struct ComputePool {
    pool: Arc<ThreadPool>,
    history: Arc<RwLock<Vec<PerformanceRecord>>>,
}

impl std::fmt::Debug for ComputePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputePool")
            .field("threads", &self.num_threads())
            .finish()
    }
}

impl ComputePool {
    /// 创建线程池，`threads == 0` 时按 CPU 核数
    pub fn new(threads: usize) -> WeResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("wave-compute-{}", i))
            .panic_handler(|_| error!("计算线程发生 panic，结果已丢弃"))
            .build()
            .map_err(|e| WeError::internal(format!("线程池创建失败: {}", e)))?;
        Ok(Self {
            pool: Arc::new(pool),
            history: Arc::new(RwLock::new(Vec::new())),
        })
    }

    /// 线程数
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// 在池内同步执行（内部的并行迭代使用本池）
    pub fn install<R, F>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(f)
    }

    /// 异步投递任务
    ///
    /// 任务 panic 时由线程池记录日志，捕获的发送端随之释放，
    /// 等待方会收到通道关闭。
    pub fn spawn<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(f)
    }

    /// 记录一次求值耗时
    pub fn record_performance(&self, num_points: usize, elapsed_secs: f64) {
        let mut history = self.history.write();
        history.push(PerformanceRecord {
            num_points,
            elapsed_secs,
            _timestamp: Instant::now(),
        });
        if history.len() > HISTORY_LIMIT {
            history.remove(0);
        }
    }

    /// 性能统计
    pub fn performance_stats(&self) -> PerformanceStats {
        let history = self.history.read();
        let total_points: usize = history.iter().map(|r| r.num_points).sum();
        let total_time: f64 = history.iter().map(|r| r.elapsed_secs).sum();
        PerformanceStats {
            invocations: history.len(),
            avg_points_per_sec: if total_time > 0.0 {
                total_points as f64 / total_time
            } else {
                0.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_threads() {
        let pool = ComputePool::new(2).unwrap();
        assert_eq!(pool.num_threads(), 2);
        assert_eq!(pool.install(|| 1 + 1), 2);
    }

    #[test]
    fn test_spawn_and_stats() {
        let pool = ComputePool::new(1).unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        pool.spawn(move || {
            let _ = tx.send(42);
        });
        assert_eq!(rx.recv().unwrap(), 42);

        pool.record_performance(100, 0.5);
        pool.record_performance(100, 0.5);
        let stats = pool.performance_stats();
        assert_eq!(stats.invocations, 2);
        assert!((stats.avg_points_per_sec - 200.0).abs() < 1e-10);
    }

    #[test]
    fn test_panic_drops_sender() {
        let pool = ComputePool::new(1).unwrap();
        let (tx, rx) = std::sync::mpsc::channel::<i32>();
        pool.spawn(move || {
            let _tx = tx;
            panic!("boom");
        });
        assert!(rx.recv().is_err());
    }
}

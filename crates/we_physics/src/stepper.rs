// crates/we_physics/src/stepper.rs

//! 模拟步进器
//!
//! 拉取式状态机：`step` 同步推进一帧；`precompute_next` / `collect_precomputed`
//! 构成单槽流水线，调用方在等待实时节拍时下一帧已在计算线程池中求值。
//!
//! ```text
//! Initial ──step──> Advancing ──(到达时间上限)──> Completed
//!    │                  │
//!    └──────stop────────┴──────────────────────> Stopped
//! ```
//!
//! 暂停不属于步进器状态，由调用方停止调用步进方法实现。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use we_config::{Region, SimulationRequest};
use we_foundation::tolerance::{exceeds_limit, reaches_limit};
use we_foundation::{WeError, WeResult};

use crate::evaluator::WaveFieldEvaluator;
use crate::frame::SimulationFrame;
use crate::grid::{GridBuilder, GridPoint};
use crate::scheduler::ComputePool;
use crate::spectrum::{SpectrumGenerator, WaveSpectrum};
use crate::wind::WindField;

/// 步进器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperState {
    /// t=0 帧尚未输出
    Initial,
    /// 正在推进
    Advancing,
    /// 已到达时间上限
    Completed,
    /// 外部停止
    Stopped,
}

/// 预计算结果：`None` 表示下一帧超出时间上限
type Precomputed = Option<(SimulationFrame, Vec<f64>)>;

/// 在途的预计算
struct Pending {
    rx: Receiver<WeResult<Precomputed>>,
    cancelled: Arc<AtomicBool>,
}

/// 模拟步进器
pub struct SimulationStepper {
    region: Region,
    grid: Arc<Vec<GridPoint>>,
    spectrum: Arc<WaveSpectrum>,
    evaluator: Arc<WaveFieldEvaluator>,
    dt: f64,
    time_limit: Option<f64>,
    current_time: f64,
    current_height: Arc<Vec<f64>>,
    step_index: usize,
    state: StepperState,
    pending: Option<Pending>,
    pool: ComputePool,
}

impl std::fmt::Debug for SimulationStepper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationStepper")
            .field("state", &self.state)
            .field("current_time", &self.current_time)
            .field("step_index", &self.step_index)
            .field("points", &self.grid.len())
            .field("components", &self.spectrum.len())
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl SimulationStepper {
    /// 由完整请求构建网格与波浪谱，并在 `pool` 中求出 t=0 波面
    ///
    /// 同步的 [`step`](Self::step) 也在该线程池中求值。
    pub fn new(request: &SimulationRequest, pool: &ComputePool) -> WeResult<Self> {
        let grid = GridBuilder::new(&request.region, &request.discretization).build()?;
        let wind = WindField::from(&request.wind);
        let spectrum = SpectrumGenerator::new(&wind, &request.spectrum).generate()?;
        Self::from_parts(
            request.region,
            grid,
            spectrum,
            request.time.dt_backend,
            request.time.time_limit(),
            pool,
        )
    }

    /// 由已有网格与波浪谱构建
    pub fn from_parts(
        region: Region,
        grid: Vec<GridPoint>,
        spectrum: WaveSpectrum,
        dt: f64,
        time_limit: Option<f64>,
        pool: &ComputePool,
    ) -> WeResult<Self> {
        if grid.is_empty() {
            return Err(WeError::EmptyGrid);
        }
        WeError::check_range("dt_backend", dt, f64::MIN_POSITIVE, f64::MAX)?;

        let evaluator = WaveFieldEvaluator::new(&spectrum, &grid);
        let start = Instant::now();
        let initial = pool.install(|| evaluator.evaluate(0.0));
        pool.record_performance(grid.len(), start.elapsed().as_secs_f64());

        info!(
            "步进器初始化: {} 点, {} 个波成分, dt={}s, 上限={:?}",
            grid.len(),
            spectrum.len(),
            dt,
            time_limit
        );

        Ok(Self {
            region,
            grid: Arc::new(grid),
            spectrum: Arc::new(spectrum),
            evaluator: Arc::new(evaluator),
            dt,
            time_limit,
            current_time: 0.0,
            current_height: Arc::new(initial),
            step_index: 0,
            state: StepperState::Initial,
            pending: None,
            pool: pool.clone(),
        })
    }

    // =========================================================================
    // 同步步进
    // =========================================================================

    /// 推进一步
    ///
    /// 首次调用返回 t=0 帧；完成或停止后始终返回 `Ok(None)`。
    /// 若有在途预计算则先取消，避免同一时刻被提交两次。
    pub fn step(&mut self) -> WeResult<Option<SimulationFrame>> {
        if self.is_completed() {
            return Ok(None);
        }
        self.cancel_pending();

        if self.state == StepperState::Initial {
            self.state = StepperState::Advancing;
            self.step_index = 1;
            return Ok(Some(self.make_frame(0.0, &self.current_height)));
        }

        let next_time = self.current_time + self.dt;
        if let Some(limit) = self.time_limit {
            if exceeds_limit(next_time, limit) {
                self.state = StepperState::Completed;
                return Ok(None);
            }
        }

        let start = Instant::now();
        let evaluator = &self.evaluator;
        let (current, dt, from_time) = (&self.current_height, self.dt, self.current_time);
        let heights = self.pool.install(|| evaluator.advance(current, dt, from_time))?;
        self.pool
            .record_performance(self.grid.len(), start.elapsed().as_secs_f64());
        let frame = self.make_frame(next_time, &heights);
        self.commit(next_time, heights);
        Ok(Some(frame))
    }

    // =========================================================================
    // 流水线
    // =========================================================================

    /// 在计算线程池中预计算下一帧，已有在途计算时不做任何事
    pub fn precompute_next(&mut self, pool: &ComputePool) {
        if self.is_completed() || self.pending.is_some() {
            return;
        }

        let (tx, rx) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&cancelled);
        let evaluator = Arc::clone(&self.evaluator);
        let grid = Arc::clone(&self.grid);
        let current = Arc::clone(&self.current_height);
        let region = self.region;
        let dt = self.dt;
        let from_time = self.current_time;
        let time_limit = self.time_limit;
        let stats = pool.clone();

        pool.spawn(move || {
            if flag.load(Ordering::Acquire) {
                return;
            }
            let next_time = from_time + dt;
            if time_limit.is_some_and(|limit| exceeds_limit(next_time, limit)) {
                let _ = tx.send(Ok(None));
                return;
            }

            let start = Instant::now();
            let result = evaluator.advance(&current, dt, from_time).map(|heights| {
                let frame = SimulationFrame::from_heights(next_time, region, &grid, &heights);
                Some((frame, heights))
            });
            stats.record_performance(grid.len(), start.elapsed().as_secs_f64());

            if !flag.load(Ordering::Acquire) {
                let _ = tx.send(result);
            }
        });

        self.pending = Some(Pending { rx, cancelled });
    }

    /// 取回预计算结果并提交，随后立即预计算再下一帧
    ///
    /// 无在途计算时先投递再等待。阻塞在通道上，不忙等。
    /// 计算线程丢失时返回 [`WeError::WorkerLost`]。
    pub fn collect_precomputed(&mut self, pool: &ComputePool) -> WeResult<Option<SimulationFrame>> {
        if self.is_completed() {
            return Ok(None);
        }
        if self.pending.is_none() {
            self.precompute_next(pool);
        }
        let Some(pending) = self.pending.take() else {
            return Ok(None);
        };

        match pending.rx.recv()?? {
            None => {
                debug!("预计算到达时间上限 t={}", self.current_time);
                self.state = StepperState::Completed;
                Ok(None)
            }
            Some((frame, heights)) => {
                if self.state == StepperState::Initial {
                    self.state = StepperState::Advancing;
                }
                self.commit(frame.time, heights);
                self.precompute_next(pool);
                Ok(Some(frame))
            }
        }
    }

    /// 停止：取消在途计算，之后所有步进调用返回 `None`
    pub fn stop(&mut self) {
        self.state = StepperState::Stopped;
        self.cancel_pending();
    }

    // =========================================================================
    // 查询
    // =========================================================================

    /// 当前状态
    pub fn state(&self) -> StepperState {
        self.state
    }

    /// 已完成（到达上限或被停止）
    pub fn is_completed(&self) -> bool {
        matches!(self.state, StepperState::Completed | StepperState::Stopped)
    }

    /// 是否被停止
    pub fn is_stopped(&self) -> bool {
        self.state == StepperState::Stopped
    }

    /// 时间上限，`None` 表示持续运行
    pub fn time_limit(&self) -> Option<f64> {
        self.time_limit
    }

    /// 总步数（含 t=0），无上限时为 `None`
    pub fn total_steps(&self) -> Option<usize> {
        self.time_limit
            .map(|limit| (limit / self.dt).floor() as usize + 1)
    }

    /// 已输出的帧数
    pub fn current_step(&self) -> usize {
        self.step_index
    }

    /// 最近提交的时刻
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// 时间步长
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// 是否有在途预计算
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 区域
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// 网格
    pub fn grid(&self) -> &[GridPoint] {
        &self.grid
    }

    /// 波浪谱
    pub fn spectrum(&self) -> &WaveSpectrum {
        &self.spectrum
    }

    // =========================================================================
    // 内部
    // =========================================================================

    fn make_frame(&self, time: f64, heights: &[f64]) -> SimulationFrame {
        SimulationFrame::from_heights(time, self.region, &self.grid, heights)
    }

    fn commit(&mut self, time: f64, heights: Vec<f64>) {
        self.current_time = time;
        self.current_height = Arc::new(heights);
        self.step_index += 1;
        if let Some(limit) = self.time_limit {
            if reaches_limit(time, limit) {
                self.state = StepperState::Completed;
            }
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancelled.store(true, Ordering::Release);
        }
    }
}

impl Drop for SimulationStepper {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

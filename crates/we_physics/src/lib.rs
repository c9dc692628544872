// crates/we_physics/src/lib.rs

//! WaveEnv 物理层
//!
//! 线性叠加的方向波浪谱海面模型：
//! - 风场 (wind)：静态风矢量
//! - 波浪谱 (spectrum)：PM 谱离散为有限个波成分
//! - 网格 (grid)：规则经纬度网格及本地平面坐标
//! - 求值 (evaluator)：任意时刻的波面高度
//! - 步进 (stepper)：逐帧推进与单槽预计算流水线
//! - 批量 (dense)：有限时长请求一次性求解
//!
//! # 数据流
//!
//! ```text
//! WindField ─> SpectrumGenerator ─┐
//!                                 ├─> WaveFieldEvaluator ─> SimulationStepper ─> SimulationFrame
//! Region ───> GridBuilder ────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dense;
pub mod evaluator;
pub mod frame;
pub mod grid;
pub mod scheduler;
pub mod spectrum;
pub mod stepper;
pub mod wind;

// 重导出常用类型
pub use dense::{simulate_dense, WaveGrid};
pub use evaluator::WaveFieldEvaluator;
pub use frame::{SimulationFrame, WavePoint};
pub use grid::{GridBuilder, GridPoint};
pub use scheduler::{ComputePool, PerformanceStats};
pub use spectrum::{SpectrumGenerator, WaveComponent, WaveSpectrum};
pub use stepper::{SimulationStepper, StepperState};
pub use wind::WindField;

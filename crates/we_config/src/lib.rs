// crates/we_config/src/lib.rs

//! WaveEnv Config Layer
//!
//! 配置层，定义一次区域海浪模拟所需的全部输入参数及引擎运行参数。
//! 所有结构体均可由 JSON 反序列化，缺省字段取默认值。
//!
//! # 模块概览
//!
//! - [`simulation`]: 区域、风场、波浪谱、离散化、时间配置
//! - [`engine`]: 引擎运行配置（线程数、暂停轮询、实时节拍）
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 6: we_cli       ─> SimulationRequest::from_file
//! Layer 5: we_workflow  ─> SimulationRequest, EngineConfig
//! Layer 3: we_physics   ─> Region, WindConfig, SpectrumConfig, ...
//! Layer 2: we_config    (本层)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod simulation;

// 重导出核心类型
pub use engine::EngineConfig;
pub use error::ConfigError;
pub use simulation::{
    DiscretizationConfig, Region, SimulationRequest, SpectrumConfig, SpectrumModel, TimeConfig,
    WindConfig,
};

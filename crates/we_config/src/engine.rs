// crates/we_config/src/engine.rs

//! 引擎运行配置

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// 模拟引擎运行参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 计算线程数，0 表示按 CPU 核数自动选择
    #[serde(default)]
    pub worker_threads: usize,

    /// 暂停状态下的轮询间隔 [ms]
    #[serde(default = "default_pause_poll_ms")]
    pub pause_poll_ms: u64,

    /// 是否按 `dt_backend` 与墙钟时间 1:1 节拍推进
    #[serde(default = "default_realtime")]
    pub realtime: bool,

    /// 同时存在的任务数上限
    #[serde(default)]
    pub max_tasks: Option<usize>,
}

fn default_pause_poll_ms() -> u64 { 100 }
fn default_realtime() -> bool { true }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            pause_poll_ms: default_pause_poll_ms(),
            realtime: default_realtime(),
            max_tasks: None,
        }
    }
}

impl EngineConfig {
    /// 设置计算线程数
    pub fn with_worker_threads(mut self, n: usize) -> Self {
        self.worker_threads = n;
        self
    }

    /// 关闭实时节拍（测试与批处理使用）
    pub fn without_pacing(mut self) -> Self {
        self.realtime = false;
        self
    }

    /// 设置暂停轮询间隔
    pub fn with_pause_poll_ms(mut self, ms: u64) -> Self {
        self.pause_poll_ms = ms;
        self
    }

    /// 设置任务数上限
    pub fn with_max_tasks(mut self, max: usize) -> Self {
        self.max_tasks = Some(max);
        self
    }

    /// 从文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: EngineConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pause_poll_ms == 0 {
            return Err(ConfigError::invalid("engine.pause_poll_ms", 0, "至少为 1"));
        }
        if self.max_tasks == Some(0) {
            return Err(ConfigError::invalid("engine.max_tasks", 0, "至少为 1"));
        }
        Ok(())
    }
}

// crates/we_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `WeError` 枚举和 `WeResult` 类型别名，供物理层与插值层使用。
//! 任务级错误（未找到、缓存过期等）在 `we_workflow` 中定义。
//!
//! # 示例
//!
//! ```
//! use we_foundation::error::{WeError, WeResult};
//!
//! fn spectrum(model: &str) -> WeResult<()> {
//!     Err(WeError::unsupported_model(model, &["PM"]))
//! }
//!
//! assert!(spectrum("JONSWAP").is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type WeResult<T> = Result<T, WeError>;

/// WaveEnv 错误类型
#[derive(Error, Debug)]
pub enum WeError {
    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数据超出范围
    #[error("数据超出范围: {field}={value}, 期望范围=[{min}, {max}]")]
    OutOfRange {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 不支持的波浪谱模型
    #[error("不支持的波浪谱模型: {model} (已实现: {supported:?})")]
    UnsupportedModel {
        /// 请求的模型
        model: String,
        /// 已实现的模型列表
        supported: Vec<String>,
    },

    /// 空网格
    #[error("网格点集合为空")]
    EmptyGrid,

    /// 后台计算线程丢失（崩溃或被提前释放）
    #[error("后台计算线程丢失: {context}")]
    WorkerLost {
        /// 发生位置
        context: String,
    },

    /// 任务取消
    #[error("任务取消")]
    TaskCancelled,

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl WeError {
    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数据超出范围
    pub fn out_of_range(field: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 不支持的模型
    pub fn unsupported_model(model: impl Into<String>, supported: &[&str]) -> Self {
        Self::UnsupportedModel {
            model: model.into(),
            supported: supported.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// 后台线程丢失
    pub fn worker_lost(context: impl Into<String>) -> Self {
        Self::WorkerLost {
            context: context.into(),
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl WeError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> WeResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查值是否在范围内（NaN 视为越界）
    #[inline]
    pub fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> WeResult<()> {
        if value.is_nan() || value < min || value > max {
            Err(Self::out_of_range(field, value, min, max))
        } else {
            Ok(())
        }
    }
}

impl<T> From<std::sync::mpsc::SendError<T>> for WeError {
    fn from(_: std::sync::mpsc::SendError<T>) -> Self {
        Self::worker_lost("结果通道已关闭")
    }
}

impl From<std::sync::mpsc::RecvError> for WeError {
    fn from(_: std::sync::mpsc::RecvError) -> Self {
        Self::worker_lost("预计算结果未送达")
    }
}

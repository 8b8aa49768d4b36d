// crates/hf_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `HfError` 枚举和 `HfResult` 类型别名，供所有 crate 使用。
//!
//! # 错误分类
//!
//! 1. **配置错误** (`Configuration`): 网格/策略/参数不一致，运行前检测并立即失败
//! 2. **数值发散** (`NumericalDivergence`): 残差或时间步非有限，由积分器上报
//! 3. **通信错误** (`Communication`): 对端不可达、消息长度不匹配、超时
//!
//! 未达到收敛不是错误，积分器通过运行结果中的终止状态区分。
//!
//! # 示例
//!
//! ```
//! use hf_foundation::error::{HfError, HfResult};
//!
//! fn load() -> HfResult<()> {
//!     Err(HfError::configuration("缺少边界标签 'wall'"))
//! }
//! assert!(load().is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type HfResult<T> = Result<T, HfError>;

/// HyperFlux 错误类型
#[derive(Error, Debug)]
pub enum HfError {
    // ========================================================================
    // 运行前检查
    // ========================================================================
    /// 配置错误（网格与策略不匹配、参数非法等）
    #[error("配置错误: {message}")]
    Configuration {
        /// 具体错误信息
        message: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    /// 无效网格拓扑
    #[error("无效的网格拓扑: {message}")]
    InvalidMesh {
        /// 具体错误信息
        message: String,
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

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },

    // ========================================================================
    // 运行期错误
    // ========================================================================
    /// 数值发散（残差或时间步出现 NaN/Inf）
    #[error("数值发散: 第{step}步 {quantity} = {value}")]
    NumericalDivergence {
        /// 发生发散的迭代步
        step: usize,
        /// 发散的物理量描述
        quantity: String,
        /// 异常值
        value: f64,
    },

    /// 进程间通信错误
    #[error("通信错误: {message}")]
    Communication {
        /// 具体错误信息
        message: String,
    },

    // ========================================================================
    // IO 与序列化
    // ========================================================================
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl HfError {
    /// 配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// 无效网格
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
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

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 数值发散
    pub fn divergence(step: usize, quantity: impl Into<String>, value: f64) -> Self {
        Self::NumericalDivergence {
            step,
            quantity: quantity.into(),
            value,
        }
    }

    /// 通信错误
    pub fn communication(message: impl Into<String>) -> Self {
        Self::Communication {
            message: message.into(),
        }
    }

    /// IO 错误
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// IO 错误（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 是否属于运行前可检测的配置类错误
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::InvalidConfig { .. }
                | Self::InvalidMesh { .. }
                | Self::SizeMismatch { .. }
                | Self::IndexOutOfBounds { .. }
        )
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl HfError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> HfResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查索引是否在范围内
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> HfResult<()> {
        if index >= len {
            Err(Self::index_out_of_bounds(index_type, index, len))
        } else {
            Ok(())
        }
    }

    /// 检查数值是否有限，否则返回数值发散错误
    #[inline]
    pub fn check_finite(step: usize, quantity: &str, value: f64) -> HfResult<()> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(Self::divergence(step, quantity, value))
        }
    }
}

/// 条件不满足时提前返回错误
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

/// 从 `Option` 取值，`None` 时提前返回错误
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr) => {
        match $opt {
            Some(v) => v,
            None => return Err($err.into()),
        }
    };
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for HfError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for HfError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

// ========================================================================
// 测试
// ========================================================================

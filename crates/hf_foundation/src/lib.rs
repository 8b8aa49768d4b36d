// crates/hf_foundation/src/lib.rs

//! HyperFlux Foundation Layer
//!
//! 基础层，为整个求解器工作区提供统一的错误类型与前置条件检查工具。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `HfError` 与结果别名 `HfResult`
//!
//! # 示例
//!
//! ```
//! use hf_foundation::{ensure, HfError, HfResult};
//!
//! fn check_vars(vars: usize) -> HfResult<()> {
//!     ensure!(vars > 0, HfError::configuration("变量数必须大于 0"));
//!     Ok(())
//! }
//!
//! assert!(check_vars(4).is_ok());
//! assert!(check_vars(0).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub use error::{HfError, HfResult};

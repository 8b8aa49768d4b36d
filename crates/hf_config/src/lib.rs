// crates/hf_config/src/lib.rs

//! HyperFlux Config Layer
//!
//! 求解器配置层。配置在运行开始前构建一次并校验，之后以不可变引用传入积分器。
//!
//! # 模块概览
//!
//! - [`solver_config`]: `SolverConfig` 时间推进与数值选项、`SnapshotConfig` 时序快照选项
//!
//! # 层级架构
//!
//! ```text
//! hf_cli     ─> 读取 JSON 配置
//! hf_solver  ─> 按引用消费 SolverConfig
//! hf_config  ─> SolverConfig (本层)
//! hf_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod solver_config;

pub use solver_config::{SnapshotConfig, SolverConfig, SolverConfigBuilder, DEFAULT_STAGE_COEFFICIENTS};

// crates/hf_solver/src/lib.rs

//! HyperFlux 显式时间推进核心
//!
//! 每个进程在自己的网格分区上重复执行：
//!
//! ```text
//! 边界策略填充 ghost → 计算时间步（局部，可选全局最小）
//!   → 每个 Runge-Kutta 级:
//!        Green-Gauss 梯度 → 限制器 → 边通量累加 → 状态更新 → ghost 交换
//!   → 残差归约 → 终止判断
//! ```
//!
//! 物理相关部分（通量函数、边界条件、时间步公式、限制器形状函数、
//! 初始条件、输出量）通过 [`policy`] 中的 trait 对象注入，在积分器构建时
//! 一次性解析。
//!
//! # 模块概览
//!
//! - [`policy`]: 物理策略 trait 与 `PolicySet`
//! - [`numerics`]: Green-Gauss 梯度与两遍限制器
//! - [`engine`]: 通量累加、ghost 交换、时间步、残差与积分器
//! - [`fields`]: 每单元工作数组

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod fields;
pub mod numerics;
pub mod policy;

pub use engine::{
    GhostExchange, Integrator, IntegratorState, MemorySnapshots, ProgressReporter, RunOutcome,
    Snapshot, SnapshotSink, TerminationStatus,
};
pub use fields::SolverFields;
pub use numerics::{create_limiter, GreenGaussGradient, LimiterEngine, LimiterShape, LimiterType};
pub use policy::{
    BoundaryCondition, BoundaryRegistry, FluxContext, FluxFunction, InitialCondition,
    OutputQuantity, PolicySet, TimeStepPolicy,
};

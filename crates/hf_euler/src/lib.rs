// crates/hf_euler/src/lib.rs

//! HyperFlux 可压缩 Euler 方程物理包
//!
//! 守恒变量 `q = [ρ, ρu, ρv, ρE]`，理想气体状态方程
//! `p = (γ - 1)(ρE - ½ρ|u|²)`。
//!
//! 本 crate 为 [`hf_solver`] 的策略 trait 提供 Euler 方程的实现：
//!
//! - [`RoeFlux`]: 带膨胀激波修正的 Roe 通量
//! - [`ZeroFlux`]、[`SlipWall`]、[`InletOutlet`]: 边界条件
//! - [`CflTimeStep`]: 基于最大特征速度的局部时间步
//! - [`SodShockTube`]、[`Freestream`]: 初始条件
//! - [`Pressure`]、[`Velocity`]、[`MachNumber`]: 输出量
//! - [`problems`]: 预置算例
//!
//! # 示例
//!
//! ```
//! use hf_euler::{IdealGas, GAMMA_AIR};
//!
//! let gas = IdealGas::new(GAMMA_AIR);
//! let q = gas.conserved(1.0, 0.0, 0.0, 1.0);
//! assert!((gas.pressure(&q) - 1.0).abs() < 1e-14);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod gas;
pub mod initial;
pub mod output;
pub mod problems;
pub mod roe;
pub mod timestep;

pub use boundary::{InletOutlet, SlipWall, ZeroFlux};
pub use gas::{IdealGas, EULER_VARIABLES, GAMMA_AIR, VARS};
pub use initial::{Freestream, SodShockTube};
pub use output::{MachNumber, Pressure, Velocity};
pub use problems::{Problem, ProblemKind};
pub use roe::RoeFlux;
pub use timestep::CflTimeStep;

// crates/hf_solver/src/numerics/mod.rs

//! 数值重构
//!
//! - [`gradient`]: Green-Gauss 单元梯度
//! - [`limiter`]: 两遍梯度限制器与限制器形状函数

pub mod gradient;
pub mod limiter;

pub use gradient::GreenGaussGradient;
pub use limiter::{create_limiter, LimiterEngine, LimiterShape, LimiterType};

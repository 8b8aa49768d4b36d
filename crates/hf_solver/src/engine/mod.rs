// crates/hf_solver/src/engine/mod.rs

//! 时间推进引擎
//!
//! - [`FluxAccumulator`]: 逐边通量散射到单元时间导数
//! - [`GhostExchange`]: 分区间晕单元同步
//! - [`TimeStepController`]: 局部/全局时间步
//! - [`ResidualReducer`]: 全局 L2 残差
//! - [`Integrator`]: 多级显式推进与终止状态机

mod boundary;
mod flux_accumulator;
mod ghost_exchange;
mod integrator;
mod progress;
mod residual;
mod snapshot;
mod timestep;

pub use boundary::BoundaryUpdater;
pub use flux_accumulator::{FluxAccumulator, FluxInputs};
pub use ghost_exchange::GhostExchange;
pub use integrator::{Integrator, IntegratorState, RunOutcome, TerminationStatus};
pub use progress::ProgressReporter;
pub use residual::ResidualReducer;
pub use snapshot::{MemorySnapshots, NoSnapshots, Snapshot, SnapshotSink};
pub use timestep::TimeStepController;

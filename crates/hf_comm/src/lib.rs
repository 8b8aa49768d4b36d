// crates/hf_comm/src/lib.rs

//! HyperFlux 通信层
//!
//! 显式通信上下文，取代隐式的全局 world 通信器。每个进程（或线程内 rank）
//! 持有一个 [`Communicator`] 实现，由积分器以引用方式使用。
//!
//! # 后端
//!
//! - [`SerialComm`]: 单进程，所有集合操作为空操作，单元测试无需通信
//! - [`LocalComm`]: 进程内多线程，每个 rank 一个线程，基于 mpsc 通道
//! - `MpiComm`: 基于 rsmpi（需开启 `mpi` feature）
//!
//! # 集合操作
//!
//! [`collective`] 提供星形拓扑的归约与广播：非根 rank 把数据发给 rank 0，
//! rank 0 归约后再广播回所有 rank。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collective;
pub mod communicator;
pub mod local;
#[cfg(feature = "mpi")]
pub mod mpi_backend;
pub mod serial;

pub use collective::{broadcast_from_root, reduce_to_root, star_all_reduce, ReduceOp};
pub use communicator::{Communicator, RecvSpec, SendSpec, ROOT_RANK};
pub use local::{run_local, LocalComm, LocalUniverse};
#[cfg(feature = "mpi")]
pub use mpi_backend::MpiComm;
pub use serial::SerialComm;

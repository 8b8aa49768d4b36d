// crates/hf_mesh/src/lib.rs

//! HyperFlux Mesh Layer
//!
//! 每个进程持有一个只读的 [`MeshPartition`]：单元与边的 SoA 数组、
//! 边界边列表以及与相邻分区交换数据用的通信描述符。
//!
//! # 单元编号约定
//!
//! ```text
//! [0, n_real_cells)         实单元（本分区拥有的单元 + 标记为 ghost 的晕单元）
//! [n_real_cells, n_cells)   边界 ghost 单元，每条边界边一个
//! ```
//!
//! # 模块概览
//!
//! - [`partition`]: 分区网格数据与校验
//! - [`builder`]: 增量构建分区网格
//! - [`descriptor`]: 边界边与通信描述符
//! - [`generation`]: 结构化矩形网格及按列条带分区

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod descriptor;
pub mod generation;
pub mod partition;

pub use builder::PartitionBuilder;
pub use descriptor::{BoundaryEdge, CommDescriptor};
pub use generation::{BoundaryTags, RectMeshGenerator};
pub use partition::{MeshPartition, PartitionStatistics};

/// 单位法向量长度容差
pub const NORMAL_TOLERANCE: f64 = 1e-8;

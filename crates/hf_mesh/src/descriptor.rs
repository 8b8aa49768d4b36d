// crates/hf_mesh/src/descriptor.rs

//! 边界边与分区间通信描述符

use serde::{Deserialize, Serialize};

/// 边界边
///
/// 边的 j 侧为边界 ghost 单元，每次迭代开始时由 `tag` 对应的边界策略填充。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryEdge {
    /// 边索引
    pub edge: usize,
    /// 边界标签
    pub tag: String,
}

/// 与一个相邻分区的通信描述符
///
/// 发送列表与对端的接收列表按相同顺序一一对应。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommDescriptor {
    /// 对端 rank
    pub peer: usize,
    /// 消息标签
    pub tag: i32,
    /// 待发送的本地单元索引（本分区拥有的单元）
    pub send_indices: Vec<usize>,
    /// 接收写入的本地单元索引（晕单元）
    pub recv_indices: Vec<usize>,
}

impl CommDescriptor {
    /// 创建描述符
    pub fn new(peer: usize, tag: i32, send_indices: Vec<usize>, recv_indices: Vec<usize>) -> Self {
        Self {
            peer,
            tag,
            send_indices,
            recv_indices,
        }
    }
}

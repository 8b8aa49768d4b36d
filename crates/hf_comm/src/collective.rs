// crates/hf_comm/src/collective.rs

//! 星形集合操作
//!
//! 所有归约都走根进程：非根 rank 把本地向量发给 rank 0，rank 0 按 rank
//! 顺序逐个归约，再把结果广播回去。归约顺序固定，因此结果在各后端之间
//! 可复现。

use hf_foundation::HfResult;

use crate::communicator::{Communicator, ROOT_RANK};

/// 归约消息标签
pub const TAG_REDUCE: i32 = 0x7FFF_0001;
/// 广播消息标签
pub const TAG_BROADCAST: i32 = 0x7FFF_0002;

/// 归约运算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// 求和
    Sum,
    /// 最小值
    Min,
    /// 最大值
    Max,
}

impl ReduceOp {
    /// 把 `incoming` 逐元素归约进 `acc`
    #[inline]
    pub fn apply(self, acc: &mut [f64], incoming: &[f64]) {
        for (a, &b) in acc.iter_mut().zip(incoming) {
            *a = match self {
                ReduceOp::Sum => *a + b,
                ReduceOp::Min => a.min(b),
                ReduceOp::Max => a.max(b),
            };
        }
    }
}

/// 归约到根进程
///
/// 返回后根进程的 `values` 为全局归约结果，非根进程的 `values` 不变。
pub fn reduce_to_root<C: Communicator + ?Sized>(
    comm: &C,
    values: &mut [f64],
    op: ReduceOp,
) -> HfResult<()> {
    if !comm.is_distributed() {
        return Ok(());
    }

    if comm.rank() == ROOT_RANK {
        let mut incoming = vec![0.0; values.len()];
        for source in 1..comm.size() {
            comm.recv(source, TAG_REDUCE, &mut incoming)?;
            op.apply(values, &incoming);
        }
    } else {
        comm.send(ROOT_RANK, TAG_REDUCE, values)?;
    }
    Ok(())
}

/// 从根进程广播
pub fn broadcast_from_root<C: Communicator + ?Sized>(comm: &C, values: &mut [f64]) -> HfResult<()> {
    if !comm.is_distributed() {
        return Ok(());
    }

    if comm.rank() == ROOT_RANK {
        for dest in 1..comm.size() {
            comm.send(dest, TAG_BROADCAST, values)?;
        }
    } else {
        comm.recv(ROOT_RANK, TAG_BROADCAST, values)?;
    }
    Ok(())
}

/// 星形全归约：归约到根进程后广播
pub fn star_all_reduce<C: Communicator + ?Sized>(
    comm: &C,
    values: &mut [f64],
    op: ReduceOp,
) -> HfResult<()> {
    reduce_to_root(comm, values, op)?;
    broadcast_from_root(comm, values)
}

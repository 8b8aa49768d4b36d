// crates/hf_solver/src/engine/timestep.rs

//! 时间步控制器
//!
//! 先由策略计算每单元局部时间步，分布式运行时交换晕单元的时间步，
//! 并归约非法时间步标志，使各 rank 一致地报告发散；
//! 全局时间步模式下再取整个分布式网格的最小值（星形归约）并写回每个槽位。

use hf_comm::{star_all_reduce, Communicator, ReduceOp};
use hf_foundation::{HfError, HfResult};
use hf_mesh::MeshPartition;

use super::ghost_exchange::GhostExchange;
use crate::policy::TimeStepPolicy;

/// 时间步控制器
#[derive(Debug, Clone, Copy)]
pub struct TimeStepController {
    global: bool,
}

impl TimeStepController {
    /// 创建控制器
    pub fn new(global: bool) -> Self {
        Self { global }
    }

    /// 是否使用全局时间步
    pub fn is_global(&self) -> bool {
        self.global
    }

    /// 计算时间步
    ///
    /// 全局模式返回同步后的时间步，局部模式返回 `None`。
    #[allow(clippy::too_many_arguments)]
    pub fn compute<C: Communicator + ?Sized>(
        &self,
        step: usize,
        comm: &C,
        mesh: &MeshPartition,
        vars: usize,
        q: &[f64],
        policy: &dyn TimeStepPolicy,
        exchange: &mut GhostExchange,
        dt: &mut [f64],
    ) -> HfResult<Option<f64>> {
        policy.compute_dt(q, mesh, vars, dt);

        let invalid = mesh
            .owned_cells()
            .flat_map(|c| dt[c * vars..(c + 1) * vars].iter().copied())
            .find(|v| !(*v > 0.0));

        if comm.is_distributed() {
            exchange.exchange(comm, dt)?;
        }

        if !self.global {
            // 任一 rank 出现非法时间步，全部 rank 一起报告
            let mut flag = [if invalid.is_some() { 1.0 } else { 0.0 }];
            star_all_reduce(comm, &mut flag, ReduceOp::Max)?;
            if flag[0] > 0.0 {
                return Err(HfError::divergence(step, "dt", invalid.unwrap_or(f64::NAN)));
            }
            return Ok(None);
        }

        // 非法局部值以负数参与归约，使所有 rank 一致地报告错误
        let local = match invalid {
            Some(_) => -1.0,
            None => dt.iter().copied().fold(f64::INFINITY, f64::min),
        };
        let mut global = [local];
        star_all_reduce(comm, &mut global, ReduceOp::Min)?;
        let global = global[0];

        if !(global > 0.0) || !global.is_finite() {
            return Err(HfError::divergence(step, "dt", invalid.unwrap_or(global)));
        }

        dt.fill(global);
        log::trace!("第{}步 全局时间步 dt = {:e}", step, global);
        Ok(Some(global))
    }
}

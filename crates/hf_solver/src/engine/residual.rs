// crates/hf_solver/src/engine/residual.rs

//! 残差归约
//!
//! 每个变量的 L2 残差 `R_k = sqrt(Σ qt_k² · A)`，只统计本分区拥有的单元。
//! 各 rank 的平方和以星形拓扑汇总到 rank 0，开方后广播回所有 rank。
//! 首次计算的残差作为基准，之后报告相对基准的比值。

use hf_comm::{broadcast_from_root, reduce_to_root, Communicator, ReduceOp};
use hf_foundation::{HfError, HfResult};
use hf_mesh::MeshPartition;

/// 残差归约器
#[derive(Debug, Clone)]
pub struct ResidualReducer {
    vars: usize,
    baseline: Option<Vec<f64>>,
    buffer: Vec<f64>,
}

impl ResidualReducer {
    /// 创建归约器
    pub fn new(vars: usize) -> Self {
        Self {
            vars,
            baseline: None,
            buffer: vec![0.0; vars],
        }
    }

    /// 基准残差
    pub fn baseline(&self) -> Option<&[f64]> {
        self.baseline.as_deref()
    }

    /// 计算全局绝对残差
    pub fn absolute<C: Communicator + ?Sized>(
        &mut self,
        step: usize,
        comm: &C,
        mesh: &MeshPartition,
        qt: &[f64],
    ) -> HfResult<Vec<f64>> {
        let vars = self.vars;
        self.buffer.fill(0.0);
        for c in mesh.owned_cells() {
            let area = mesh.cell_area[c];
            for k in 0..vars {
                let v = qt[c * vars + k];
                self.buffer[k] += v * v * area;
            }
        }

        reduce_to_root(comm, &mut self.buffer, ReduceOp::Sum)?;
        if comm.is_root() {
            self.buffer.iter_mut().for_each(|s| *s = s.sqrt());
        }
        broadcast_from_root(comm, &mut self.buffer)?;

        for (k, &r) in self.buffer.iter().enumerate() {
            HfError::check_finite(step, &format!("R(q[{k}])"), r)?;
        }
        Ok(self.buffer.clone())
    }

    /// 计算残差比
    ///
    /// 首次调用建立基准并返回全 1。某变量基准为 0 时，该变量报告绝对残差。
    pub fn ratio<C: Communicator + ?Sized>(
        &mut self,
        step: usize,
        comm: &C,
        mesh: &MeshPartition,
        qt: &[f64],
    ) -> HfResult<Vec<f64>> {
        let absolute = self.absolute(step, comm, mesh, qt)?;

        match &self.baseline {
            None => {
                log::debug!("残差基准: {:?}", absolute);
                self.baseline = Some(absolute);
                Ok(vec![1.0; self.vars])
            }
            Some(base) => Ok(absolute
                .iter()
                .zip(base)
                .map(|(&r, &r0)| if r0 > 0.0 { r / r0 } else { r })
                .collect()),
        }
    }
}

// crates/hf_solver/src/engine/boundary.rs

//! 边界 ghost 单元填充
//!
//! 每次迭代开始时，按构建期解析好的绑定，用内部单元状态计算每个
//! 边界 ghost 单元的状态。

use hf_foundation::{HfError, HfResult};
use hf_mesh::MeshPartition;

use crate::policy::{BoundaryBinding, BoundaryRegistry};

/// 边界更新器
#[derive(Debug, Clone)]
pub struct BoundaryUpdater {
    bindings: Vec<BoundaryBinding>,
}

impl BoundaryUpdater {
    /// 解析网格的全部边界边
    pub fn new(registry: &BoundaryRegistry, mesh: &MeshPartition) -> HfResult<Self> {
        let bindings = registry.resolve(mesh)?;
        if let Some(b) = bindings.iter().find(|b| b.interior >= b.ghost) {
            return Err(HfError::invalid_mesh(format!(
                "边界边 {} 的内部单元 {} 不在 ghost 单元 {} 之前",
                b.edge, b.interior, b.ghost
            )));
        }
        Ok(Self { bindings })
    }

    /// 绑定数量
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// 是否没有边界边
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 填充全部 ghost 单元
    pub fn apply(&self, vars: usize, q: &mut [f64]) {
        for b in &self.bindings {
            let (lo, hi) = q.split_at_mut(b.ghost * vars);
            let interior = &lo[b.interior * vars..(b.interior + 1) * vars];
            b.condition.ghost_state(interior, b.normal, &mut hi[..vars]);
        }
    }
}

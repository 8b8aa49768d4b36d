// crates/hf_solver/src/policy/timestep.rs

//! 时间步策略

use std::fmt::Debug;

use hf_mesh::MeshPartition;

/// 时间步公式
///
/// 为每个单元的每个变量写入稳定时间步，`dt` 与状态数组同长。
pub trait TimeStepPolicy: Debug + Send + Sync {
    /// 计算局部时间步
    fn compute_dt(&self, q: &[f64], mesh: &MeshPartition, vars: usize, dt: &mut [f64]);

    /// 名称
    fn name(&self) -> &'static str;

    /// 要求的变量数，`None` 表示适用于任意变量数
    fn vars(&self) -> Option<usize> {
        None
    }
}

/// 常数时间步
#[derive(Debug, Clone, Copy)]
pub struct ConstantTimeStep {
    dt: f64,
}

impl ConstantTimeStep {
    /// 创建常数时间步
    pub fn new(dt: f64) -> Self {
        Self { dt }
    }

    /// 时间步
    pub fn dt(&self) -> f64 {
        self.dt
    }
}

impl TimeStepPolicy for ConstantTimeStep {
    fn compute_dt(&self, _q: &[f64], _mesh: &MeshPartition, _vars: usize, dt: &mut [f64]) {
        dt.fill(self.dt);
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

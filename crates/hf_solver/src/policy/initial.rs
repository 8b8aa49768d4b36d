// crates/hf_solver/src/policy/initial.rs

//! 初始条件策略

use glam::DVec2;
use std::fmt::{self, Debug};

use hf_mesh::MeshPartition;

/// 初始条件
pub trait InitialCondition: Debug + Send + Sync {
    /// 为全部单元（含 ghost）写入初始状态，`q` 长度为 `vars * n_cells`
    fn initialize(&self, mesh: &MeshPartition, vars: usize, q: &mut [f64]);

    /// 名称
    fn name(&self) -> &'static str;

    /// 要求的变量数，`None` 表示适用于任意变量数
    fn vars(&self) -> Option<usize> {
        None
    }
}

/// 均匀初始状态
#[derive(Debug, Clone)]
pub struct UniformState {
    state: Vec<f64>,
}

impl UniformState {
    /// 创建均匀状态
    pub fn new(state: impl Into<Vec<f64>>) -> Self {
        Self {
            state: state.into(),
        }
    }
}

impl InitialCondition for UniformState {
    fn initialize(&self, _mesh: &MeshPartition, vars: usize, q: &mut [f64]) {
        for cell in q.chunks_exact_mut(vars) {
            for (dst, src) in cell.iter_mut().zip(&self.state) {
                *dst = *src;
            }
        }
    }

    fn name(&self) -> &'static str {
        "uniform"
    }

    fn vars(&self) -> Option<usize> {
        Some(self.state.len())
    }
}

/// 按单元中心坐标逐单元赋值的初始条件
pub struct CellwiseInitial<F> {
    name: &'static str,
    f: F,
}

impl<F> CellwiseInitial<F>
where
    F: Fn(DVec2, &mut [f64]) + Send + Sync,
{
    /// 以名称和赋值函数创建
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> Debug for CellwiseInitial<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellwiseInitial").field("name", &self.name).finish()
    }
}

impl<F> InitialCondition for CellwiseInitial<F>
where
    F: Fn(DVec2, &mut [f64]) + Send + Sync,
{
    fn initialize(&self, mesh: &MeshPartition, vars: usize, q: &mut [f64]) {
        for (c, cell) in q.chunks_exact_mut(vars).enumerate() {
            (self.f)(mesh.cell_center[c], cell);
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

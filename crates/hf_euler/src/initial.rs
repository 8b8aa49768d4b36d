// crates/hf_euler/src/initial.rs

//! Euler 方程初始条件

use hf_mesh::MeshPartition;
use hf_solver::policy::InitialCondition;

use crate::gas::{IdealGas, VARS};

/// Sod 激波管
///
/// `x < x_split`: ρ = 1, p = 1；否则 ρ = 0.125, p = 0.1，速度均为零。
#[derive(Debug, Clone, Copy)]
pub struct SodShockTube {
    gas: IdealGas,
    x_split: f64,
}

impl SodShockTube {
    /// 以间断位置创建
    pub fn new(gas: IdealGas, x_split: f64) -> Self {
        Self { gas, x_split }
    }

    /// 左侧状态
    pub fn left(&self) -> [f64; VARS] {
        self.gas.conserved(1.0, 0.0, 0.0, 1.0)
    }

    /// 右侧状态
    pub fn right(&self) -> [f64; VARS] {
        self.gas.conserved(0.125, 0.0, 0.0, 0.1)
    }
}

impl Default for SodShockTube {
    fn default() -> Self {
        Self::new(IdealGas::default(), 0.5)
    }
}

impl InitialCondition for SodShockTube {
    fn initialize(&self, mesh: &MeshPartition, vars: usize, q: &mut [f64]) {
        let (left, right) = (self.left(), self.right());
        for (c, cell) in q.chunks_exact_mut(vars).enumerate() {
            let state = if mesh.cell_center[c].x < self.x_split { &left } else { &right };
            cell.copy_from_slice(state);
        }
    }

    fn name(&self) -> &'static str {
        "sod"
    }

    fn vars(&self) -> Option<usize> {
        Some(VARS)
    }
}

/// 均匀来流
#[derive(Debug, Clone, Copy)]
pub struct Freestream {
    state: [f64; VARS],
}

impl Freestream {
    /// 以守恒状态创建
    pub fn new(state: [f64; VARS]) -> Self {
        Self { state }
    }

    /// x 方向来流，ρ = γ, p = 1（声速为 1）
    pub fn mach(gas: IdealGas, mach: f64) -> Self {
        Self::new(gas.conserved(gas.gamma(), mach, 0.0, 1.0))
    }

    /// 来流状态
    pub fn state(&self) -> [f64; VARS] {
        self.state
    }
}

impl InitialCondition for Freestream {
    fn initialize(&self, _mesh: &MeshPartition, vars: usize, q: &mut [f64]) {
        for cell in q.chunks_exact_mut(vars) {
            cell.copy_from_slice(&self.state);
        }
    }

    fn name(&self) -> &'static str {
        "freestream"
    }

    fn vars(&self) -> Option<usize> {
        Some(VARS)
    }
}

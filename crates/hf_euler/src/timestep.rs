// crates/hf_euler/src/timestep.rs

//! CFL 局部时间步
//!
//! 每条边取两侧最大特征速度 `c + |u·n|` 的较大者乘以边长，累加到两侧单元；
//! `dt = CFL · A / Σ`。

use hf_mesh::MeshPartition;
use hf_solver::policy::TimeStepPolicy;

use crate::gas::{IdealGas, VARS};

/// CFL 时间步
#[derive(Debug, Clone, Copy)]
pub struct CflTimeStep {
    gas: IdealGas,
    cfl: f64,
}

impl CflTimeStep {
    /// 默认 CFL 数
    pub const DEFAULT_CFL: f64 = 1.5;

    /// 创建
    pub fn new(gas: IdealGas, cfl: f64) -> Self {
        Self { gas, cfl }
    }

    /// CFL 数
    pub fn cfl(&self) -> f64 {
        self.cfl
    }

    #[inline]
    fn max_eigenvalue(&self, q: &[f64], nx: f64, ny: f64) -> f64 {
        let (u, v) = self.gas.velocity(q);
        self.gas.sound_speed(q) + (u * nx + v * ny).abs()
    }
}

impl Default for CflTimeStep {
    fn default() -> Self {
        Self::new(IdealGas::default(), Self::DEFAULT_CFL)
    }
}

impl TimeStepPolicy for CflTimeStep {
    fn compute_dt(&self, q: &[f64], mesh: &MeshPartition, vars: usize, dt: &mut [f64]) {
        dt.fill(0.0);
        for e in 0..mesh.n_edges() {
            let (i, j) = mesh.edge_cells(e);
            let n = mesh.edge_normal[e];
            let qi = &q[i * vars..(i + 1) * vars];
            let qj = &q[j * vars..(j + 1) * vars];
            let eig = self
                .max_eigenvalue(qi, n.x, n.y)
                .max(self.max_eigenvalue(qj, n.x, n.y));
            let s = eig * mesh.edge_length[e];
            dt[i * vars..(i + 1) * vars].iter_mut().for_each(|d| *d += s);
            dt[j * vars..(j + 1) * vars].iter_mut().for_each(|d| *d += s);
        }

        for (c, cell) in dt.chunks_exact_mut(vars).enumerate() {
            let area = mesh.cell_area[c];
            cell.iter_mut().for_each(|d| *d = self.cfl * area / *d);
        }
    }

    fn name(&self) -> &'static str {
        "cfl"
    }

    fn vars(&self) -> Option<usize> {
        Some(VARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_mesh::RectMeshGenerator;

    #[test]
    fn test_still_gas_square_cells() {
        // 静止气体 c = 1，单位正方形单元四条边: Σ = 4，dt = CFL / 4
        let gas = IdealGas::default();
        let mesh = RectMeshGenerator::new(3, 3, 3.0, 3.0).build().unwrap();
        let state = gas.conserved(gas.gamma(), 0.0, 0.0, 1.0);
        let q: Vec<f64> = (0..mesh.n_cells).flat_map(|_| state).collect();
        let mut dt = vec![0.0; q.len()];

        CflTimeStep::new(gas, 1.0).compute_dt(&q, &mesh, 4, &mut dt);

        for c in mesh.owned_cells() {
            assert!((dt[4 * c] - 0.25).abs() < 1e-12);
        }
        // 边界 ghost 单元只有一条边
        assert!((dt[4 * mesh.n_real_cells] - 1.0).abs() < 1e-12);
    }
}

// crates/hf_solver/src/numerics/gradient.rs

//! Green-Gauss 梯度计算
//!
//! 使用 Green 定理将面积分转化为边积分:
//! ∇φ_i ≈ (1/A_i) Σ_e φ_e · n_e · L_e，φ_e = (φ_i + φ_j) / 2
//!
//! 每条边的贡献加到 i 单元、从 j 单元减去（法向由 i 指向 j）。
//! 只有本分区拥有的单元做面积归一化，ghost 与边界 ghost 的梯度置零；
//! 分布式运行时晕单元的梯度随后由 ghost 交换覆盖。

use hf_mesh::MeshPartition;

/// Green-Gauss 梯度计算器
#[derive(Debug, Clone, Copy, Default)]
pub struct GreenGaussGradient;

impl GreenGaussGradient {
    /// 创建新实例
    pub fn new() -> Self {
        Self
    }

    /// 计算全部变量的梯度
    ///
    /// `q`、`gx`、`gy` 长度均为 `vars * n_cells`。
    pub fn compute(
        &self,
        mesh: &MeshPartition,
        vars: usize,
        q: &[f64],
        gx: &mut [f64],
        gy: &mut [f64],
    ) {
        gx.fill(0.0);
        gy.fill(0.0);

        for e in 0..mesh.n_edges() {
            let (i, j) = mesh.edge_cells(e);
            if i == j {
                continue;
            }
            let n = mesh.edge_normal[e];
            let half_len = 0.5 * mesh.edge_length[e];

            for k in 0..vars {
                let face = (q[i * vars + k] + q[j * vars + k]) * half_len;
                gx[i * vars + k] += face * n.x;
                gy[i * vars + k] += face * n.y;
                gx[j * vars + k] -= face * n.x;
                gy[j * vars + k] -= face * n.y;
            }
        }

        for c in 0..mesh.n_cells {
            let range = c * vars..(c + 1) * vars;
            if mesh.is_owned(c) {
                let inv_area = 1.0 / mesh.cell_area[c];
                gx[range.clone()].iter_mut().for_each(|g| *g *= inv_area);
                gy[range].iter_mut().for_each(|g| *g *= inv_area);
            } else {
                gx[range.clone()].fill(0.0);
                gy[range].fill(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use hf_mesh::RectMeshGenerator;

    /// 线性场: ghost 单元按其镜像中心取值，使边界单元同样精确
    fn linear_field(mesh: &MeshPartition, a: f64, b: f64, c: f64) -> Vec<f64> {
        mesh.cell_center
            .iter()
            .map(|p: &DVec2| a * p.x + b * p.y + c)
            .collect()
    }

    #[test]
    fn test_linear_field_exact() {
        let mesh = RectMeshGenerator::new(6, 5, 3.0, 2.0).build().unwrap();
        let q = linear_field(&mesh, 2.0, -3.0, 1.0);
        let mut gx = vec![0.0; mesh.n_cells];
        let mut gy = vec![0.0; mesh.n_cells];

        GreenGaussGradient::new().compute(&mesh, 1, &q, &mut gx, &mut gy);

        for c in mesh.owned_cells() {
            assert!((gx[c] - 2.0).abs() < 1e-10, "单元 {} gx = {}", c, gx[c]);
            assert!((gy[c] + 3.0).abs() < 1e-10, "单元 {} gy = {}", c, gy[c]);
        }
    }

    #[test]
    fn test_constant_field_zero_gradient() {
        let mesh = RectMeshGenerator::new(3, 3, 1.0, 1.0).build().unwrap();
        let q = vec![4.2; mesh.n_cells * 2];
        let mut gx = vec![1.0; q.len()];
        let mut gy = vec![1.0; q.len()];

        GreenGaussGradient::new().compute(&mesh, 2, &q, &mut gx, &mut gy);

        assert!(gx.iter().all(|g| g.abs() < 1e-12));
        assert!(gy.iter().all(|g| g.abs() < 1e-12));
    }

    #[test]
    fn test_ghost_gradients_zeroed() {
        let mesh = RectMeshGenerator::new(2, 2, 1.0, 1.0).build().unwrap();
        let q = linear_field(&mesh, 1.0, 1.0, 0.0);
        let mut gx = vec![0.0; mesh.n_cells];
        let mut gy = vec![0.0; mesh.n_cells];

        GreenGaussGradient::new().compute(&mesh, 1, &q, &mut gx, &mut gy);

        for c in mesh.n_real_cells..mesh.n_cells {
            assert_eq!(gx[c], 0.0);
            assert_eq!(gy[c], 0.0);
        }
    }
}

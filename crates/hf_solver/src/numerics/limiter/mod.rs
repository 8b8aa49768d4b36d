// crates/hf_solver/src/numerics/limiter/mod.rs

//! # 梯度限制器
//!
//! 两遍算法，为每个单元每个变量计算限制因子 α ∈ [0, 1]：
//!
//! 1. 以单元自身值初始化 qmin/qmax，再沿每条边双向松弛，得到邻域极值
//! 2. 对每条边上属于本分区的端点，用梯度外推到边中心的变化量
//!    `dqg = ∇q · (x_e - x_c)` 与允许变化量之比调用形状函数，
//!    并与光滑混合因子组合后取所有边的最小值
//!
//! 第二遍依赖第一遍完整的极值，两遍不能合并。
//!
//! ## 光滑混合
//!
//! ```text
//! Ka = K·sqrt(A),  K3 = Ka³,  D = (Δmax - Δmin)²
//! σ = 1                      D ≤ K3
//! σ = 2y³ - 3y² + 1          K3 < D < 2·K3,  y = D/K3 - 1
//! σ = 0                      D ≥ 2·K3
//! α_e = σ + (1 - σ)·φ(r)
//! ```
//!
//! ## 形状函数
//!
//! | 形状 | 说明 |
//! |------|------|
//! | `FirstOrder` | φ = 0，间断附近退化为一阶 |
//! | `BarthJespersen` | φ = min(1, r) |
//! | `Venkatakrishnan` | 光滑有理函数 |
//! | `Michalak` | 三次多项式，yt 处光滑过渡到 1 |
//! | `Unlimited` | φ = 1 |

mod shapes;

pub use shapes::{BarthJespersen, FirstOrder, Michalak, Unlimited, Venkatakrishnan};

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use hf_mesh::MeshPartition;

/// 梯度外推量的零阈值
pub const GRADIENT_TOLERANCE: f64 = 1e-15;

/// 限制器形状函数
pub trait LimiterShape: Debug + Send + Sync {
    /// 由比值 r 计算形状值
    fn shape(&self, ratio: f64) -> f64;

    /// 名称
    fn name(&self) -> &'static str;
}

/// 限制器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimiterType {
    /// 一阶
    FirstOrder,
    /// Barth-Jespersen
    #[default]
    BarthJespersen,
    /// Venkatakrishnan
    Venkatakrishnan,
    /// Michalak（yt = 2）
    Michalak,
    /// 不限制
    Unlimited,
}

/// 根据类型创建形状函数
pub fn create_limiter(limiter_type: LimiterType) -> Arc<dyn LimiterShape> {
    match limiter_type {
        LimiterType::FirstOrder => Arc::new(FirstOrder),
        LimiterType::BarthJespersen => Arc::new(BarthJespersen),
        LimiterType::Venkatakrishnan => Arc::new(Venkatakrishnan),
        LimiterType::Michalak => Arc::new(Michalak::default()),
        LimiterType::Unlimited => Arc::new(Unlimited),
    }
}

/// 两遍限制器
#[derive(Debug, Clone, Copy)]
pub struct LimiterEngine {
    /// 光滑阈值系数 K
    k: f64,
}

impl Default for LimiterEngine {
    fn default() -> Self {
        Self { k: 1.0 }
    }
}

impl LimiterEngine {
    /// 以系数 K 创建
    pub fn new(k: f64) -> Self {
        Self { k }
    }

    /// 系数 K
    pub fn k(&self) -> f64 {
        self.k
    }

    /// 光滑混合因子 σ
    #[inline]
    pub fn smoothness(&self, area: f64, delta_max: f64, delta_min: f64) -> f64 {
        let ka = self.k * area.sqrt();
        let k3 = ka * ka * ka;
        let d2 = (delta_max - delta_min) * (delta_max - delta_min);

        if d2 <= k3 {
            1.0
        } else if d2 < 2.0 * k3 {
            let y = d2 / k3 - 1.0;
            2.0 * y * y * y - 3.0 * y * y + 1.0
        } else {
            0.0
        }
    }

    /// 计算全部单元的限制因子
    ///
    /// 所有数组长度均为 `vars * n_cells`。不属于本分区的单元限制因子为 1。
    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        &self,
        mesh: &MeshPartition,
        vars: usize,
        q: &[f64],
        gx: &[f64],
        gy: &[f64],
        shape: &dyn LimiterShape,
        qmin: &mut [f64],
        qmax: &mut [f64],
        limiters: &mut [f64],
    ) {
        limiters.fill(1.0);
        qmin.copy_from_slice(q);
        qmax.copy_from_slice(q);

        // 第一遍: 邻域极值
        for e in 0..mesh.n_edges() {
            let (i, j) = mesh.edge_cells(e);
            for k in 0..vars {
                let (qi, qj) = (q[i * vars + k], q[j * vars + k]);
                qmin[i * vars + k] = qmin[i * vars + k].min(qj);
                qmin[j * vars + k] = qmin[j * vars + k].min(qi);
                qmax[i * vars + k] = qmax[i * vars + k].max(qj);
                qmax[j * vars + k] = qmax[j * vars + k].max(qi);
            }
        }

        // 第二遍: 逐边端点取最小限制因子
        for e in 0..mesh.n_edges() {
            let (i, j) = mesh.edge_cells(e);
            for (id, d) in [(i, mesh.edge_delta_i[e]), (j, mesh.edge_delta_j[e])] {
                if !mesh.is_owned(id) {
                    continue;
                }
                let area = mesh.cell_area[id];

                for k in 0..vars {
                    let idx = id * vars + k;
                    let dqg = gx[idx] * d.x + gy[idx] * d.y;
                    let delta_max = qmax[idx] - q[idx];
                    let delta_min = qmin[idx] - q[idx];

                    let sig = self.smoothness(area, delta_max, delta_min);
                    let raw = if dqg > GRADIENT_TOLERANCE {
                        shape.shape(delta_max / dqg)
                    } else if dqg < -GRADIENT_TOLERANCE {
                        shape.shape(delta_min / dqg)
                    } else {
                        1.0
                    };

                    let lim = (sig + (1.0 - sig) * raw).clamp(0.0, 1.0);
                    limiters[idx] = limiters[idx].min(lim);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use hf_mesh::{PartitionBuilder, RectMeshGenerator};

    fn compute(mesh: &MeshPartition, q: &[f64], gx: &[f64], gy: &[f64], k: f64) -> Vec<f64> {
        let mut qmin = vec![0.0; q.len()];
        let mut qmax = vec![0.0; q.len()];
        let mut lim = vec![0.0; q.len()];
        LimiterEngine::new(k).compute(mesh, 1, q, gx, gy, &BarthJespersen, &mut qmin, &mut qmax, &mut lim);
        lim
    }

    #[test]
    fn test_smoothness_regions() {
        let engine = LimiterEngine::new(1.0);
        // area = 1 → K3 = 1
        assert_eq!(engine.smoothness(1.0, 0.5, -0.4), 1.0);
        assert_eq!(engine.smoothness(1.0, 2.0, 0.0), 0.0);
        let mid = engine.smoothness(1.0, 1.2, 0.0);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_zero_gradient_gives_one() {
        let mesh = RectMeshGenerator::new(3, 1, 3.0, 1.0).build().unwrap();
        let q: Vec<f64> = (0..mesh.n_cells).map(|c| c as f64).collect();
        let zeros = vec![0.0; mesh.n_cells];
        let lim = compute(&mesh, &q, &zeros, &zeros, 1e-3);
        assert!(lim.iter().all(|&l| l == 1.0));
    }

    #[test]
    fn test_local_extremum_fully_limited() {
        // 中间单元为局部极大值且梯度非零，K 很小使 σ = 0
        let mut b = PartitionBuilder::new();
        let a = b.add_cell(1.0, DVec2::new(0.5, 0.5));
        let m = b.add_cell(1.0, DVec2::new(1.5, 0.5));
        let c = b.add_cell(1.0, DVec2::new(2.5, 0.5));
        b.add_edge(a, m, DVec2::X, 1.0, DVec2::new(1.0, 0.5));
        b.add_edge(m, c, DVec2::X, 1.0, DVec2::new(2.0, 0.5));
        let mesh = b.build().unwrap();

        let q = [0.0, 10.0, 0.0];
        let gx = [0.0, 5.0, 0.0];
        let gy = [0.0; 3];
        let lim = compute(&mesh, &q, &gx, &gy, 1e-3);

        assert!(lim[m].abs() < 1e-12, "局部极值处限制因子应为 0: {}", lim[m]);
    }

    #[test]
    fn test_smooth_region_not_limited() {
        // 线性场在大 K 下 σ = 1
        let mesh = RectMeshGenerator::new(4, 4, 1.0, 1.0).build().unwrap();
        let q: Vec<f64> = mesh.cell_center.iter().map(|p| 0.01 * p.x).collect();
        let gx = vec![0.01; mesh.n_cells];
        let gy = vec![0.0; mesh.n_cells];
        let lim = compute(&mesh, &q, &gx, &gy, 10.0);
        for c in mesh.owned_cells() {
            assert!((lim[c] - 1.0).abs() < 1e-14);
        }
    }

    #[test]
    fn test_bounds_with_overshooting_shape() {
        let mesh = RectMeshGenerator::new(5, 1, 5.0, 1.0).build().unwrap();
        let q: Vec<f64> = (0..mesh.n_cells).map(|c| ((c * 7) % 5) as f64).collect();
        let gx: Vec<f64> = (0..mesh.n_cells).map(|c| (c as f64 - 2.0) * 0.3).collect();
        let gy = vec![0.1; mesh.n_cells];

        let mut qmin = vec![0.0; q.len()];
        let mut qmax = vec![0.0; q.len()];
        let mut lim = vec![0.0; q.len()];
        LimiterEngine::new(0.01).compute(
            &mesh, 1, &q, &gx, &gy, &Venkatakrishnan, &mut qmin, &mut qmax, &mut lim,
        );
        assert!(lim.iter().all(|l| (0.0..=1.0).contains(l)));
    }

    #[test]
    fn test_create_limiter() {
        assert_eq!(create_limiter(LimiterType::Michalak).name(), "michalak");
        assert_eq!(create_limiter(LimiterType::default()).name(), "barth_jespersen");
    }
}

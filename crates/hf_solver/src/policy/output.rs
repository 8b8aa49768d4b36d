// crates/hf_solver/src/policy/output.rs

//! 额外输出量
//!
//! 由守恒变量逐单元导出的后处理量（如压力、速度、马赫数），
//! 仅供输出使用，不参与时间推进。

use std::fmt::Debug;

use hf_mesh::MeshPartition;

/// 输出量
pub trait OutputQuantity: Debug + Send + Sync {
    /// 名称
    fn name(&self) -> &str;

    /// 分量数（标量为 1，速度等矢量为 2）
    fn components(&self) -> usize {
        1
    }

    /// 由单元状态计算输出，`out` 长度为 `components()`
    fn evaluate(&self, q_cell: &[f64], out: &mut [f64]);

    /// 要求的变量数，`None` 表示适用于任意变量数
    fn vars(&self) -> Option<usize> {
        None
    }
}

/// 在全部实单元上计算输出量，返回 `components * n_real_cells` 个值
pub fn evaluate_output(
    quantity: &dyn OutputQuantity,
    mesh: &MeshPartition,
    vars: usize,
    q: &[f64],
) -> Vec<f64> {
    let nc = quantity.components();
    if nc == 0 {
        return Vec::new();
    }
    let mut out = vec![0.0; nc * mesh.n_real_cells];
    for (c, slot) in out.chunks_exact_mut(nc).enumerate() {
        quantity.evaluate(&q[c * vars..(c + 1) * vars], slot);
    }
    out
}

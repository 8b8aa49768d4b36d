// crates/hf_solver/src/engine/flux_accumulator.rs

//! 通量累加器模块
//!
//! 逐边调用策略通量函数，把 `f·L` 从 i 单元减去、加到 j 单元，
//! 最后对本分区拥有的单元除以面积得到时间导数 `qt`。
//! ghost 单元与边界 ghost 单元的 `qt` 恒为零。
//!
//! # 并行
//!
//! 边数超过阈值且开启并行时，先用 rayon 并行计算每条边的通量写入
//! 按边排列的暂存数组，再按边顺序串行散射，结果与串行路径逐位一致。

use rayon::prelude::*;

use hf_mesh::MeshPartition;

use crate::policy::{FluxContext, FluxFunction};

/// 通量计算所需的单元数据
#[derive(Debug, Clone, Copy)]
pub struct FluxInputs<'a> {
    /// 状态
    pub q: &'a [f64],
    /// x 梯度
    pub gx: &'a [f64],
    /// y 梯度
    pub gy: &'a [f64],
    /// 限制因子
    pub limiters: &'a [f64],
}

/// 通量累加器
#[derive(Debug, Clone)]
pub struct FluxAccumulator {
    vars: usize,
    /// 是否线性重构面状态
    reconstruct: bool,
    /// 是否允许并行
    parallel: bool,
    /// 并行阈值（边数）
    parallel_threshold: usize,
    // 串行暂存
    flux: Vec<f64>,
    face_i: Vec<f64>,
    face_j: Vec<f64>,
    // 并行暂存: n_edges * vars
    edge_flux: Vec<f64>,
}

impl FluxAccumulator {
    /// 创建通量累加器
    pub fn new(vars: usize, reconstruct: bool) -> Self {
        Self {
            vars,
            reconstruct,
            parallel: false,
            parallel_threshold: usize::MAX,
            flux: vec![0.0; vars],
            face_i: vec![0.0; vars],
            face_j: vec![0.0; vars],
            edge_flux: Vec::new(),
        }
    }

    /// 开启并行边通量计算
    pub fn with_parallel(mut self, enabled: bool, threshold: usize) -> Self {
        self.parallel = enabled;
        self.parallel_threshold = threshold;
        self
    }

    /// 计算时间导数写入 `qt`
    pub fn compute(
        &mut self,
        mesh: &MeshPartition,
        inputs: FluxInputs<'_>,
        flux_fn: &dyn FluxFunction,
        qt: &mut [f64],
    ) {
        qt.fill(0.0);
        let vars = self.vars;

        if self.parallel && mesh.n_edges() >= self.parallel_threshold {
            self.edge_flux.resize(mesh.n_edges() * vars, 0.0);
            let reconstruct = self.reconstruct;
            self.edge_flux
                .par_chunks_mut(vars)
                .enumerate()
                .for_each_init(
                    || (vec![0.0; vars], vec![0.0; vars]),
                    |(face_i, face_j), (e, out)| {
                        evaluate_edge(mesh, e, vars, &inputs, flux_fn, reconstruct, face_i, face_j, out);
                    },
                );

            for e in 0..mesh.n_edges() {
                let f = &self.edge_flux[e * vars..(e + 1) * vars];
                scatter(mesh, e, vars, f, qt);
            }
        } else {
            for e in 0..mesh.n_edges() {
                evaluate_edge(
                    mesh,
                    e,
                    vars,
                    &inputs,
                    flux_fn,
                    self.reconstruct,
                    &mut self.face_i,
                    &mut self.face_j,
                    &mut self.flux,
                );
                scatter(mesh, e, vars, &self.flux, qt);
            }
        }

        normalize(mesh, vars, qt);
    }
}

/// 计算单条边的通量
#[allow(clippy::too_many_arguments)]
#[inline]
fn evaluate_edge(
    mesh: &MeshPartition,
    e: usize,
    vars: usize,
    inputs: &FluxInputs<'_>,
    flux_fn: &dyn FluxFunction,
    reconstruct: bool,
    face_i: &mut [f64],
    face_j: &mut [f64],
    flux: &mut [f64],
) {
    let (i, j) = mesh.edge_cells(e);
    let ri = i * vars..(i + 1) * vars;
    let rj = j * vars..(j + 1) * vars;
    let d_i = mesh.edge_delta_i[e];
    let d_j = mesh.edge_delta_j[e];

    let (q_i, q_j): (&[f64], &[f64]) = if reconstruct {
        for k in 0..vars {
            let a = i * vars + k;
            let b = j * vars + k;
            face_i[k] = inputs.q[a] + inputs.limiters[a] * (inputs.gx[a] * d_i.x + inputs.gy[a] * d_i.y);
            face_j[k] = inputs.q[b] + inputs.limiters[b] * (inputs.gx[b] * d_j.x + inputs.gy[b] * d_j.y);
        }
        (face_i, face_j)
    } else {
        (&inputs.q[ri.clone()], &inputs.q[rj.clone()])
    };

    let ctx = FluxContext {
        q_i,
        q_j,
        gx_i: &inputs.gx[ri.clone()],
        gy_i: &inputs.gy[ri.clone()],
        gx_j: &inputs.gx[rj.clone()],
        gy_j: &inputs.gy[rj.clone()],
        lim_i: &inputs.limiters[ri],
        lim_j: &inputs.limiters[rj],
        normal: mesh.edge_normal[e],
        d_i,
        d_j,
        area_i: mesh.cell_area[i],
        length: mesh.edge_length[e],
    };
    flux_fn.compute_flux(&ctx, flux);
}

/// i 侧流出为负，j 侧流入为正
#[inline]
fn scatter(mesh: &MeshPartition, e: usize, vars: usize, flux: &[f64], qt: &mut [f64]) {
    let (i, j) = mesh.edge_cells(e);
    let len = mesh.edge_length[e];
    for k in 0..vars {
        let f = flux[k] * len;
        qt[i * vars + k] -= f;
        qt[j * vars + k] += f;
    }
}

fn normalize(mesh: &MeshPartition, vars: usize, qt: &mut [f64]) {
    for (c, cell) in qt.chunks_exact_mut(vars).enumerate() {
        if mesh.is_owned(c) {
            let inv_area = 1.0 / mesh.cell_area[c];
            cell.iter_mut().for_each(|v| *v *= inv_area);
        } else {
            cell.fill(0.0);
        }
    }
}

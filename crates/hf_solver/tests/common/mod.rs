// crates/hf_solver/tests/common/mod.rs

//! 集成测试共用的标量模型

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::Arc;

use glam::DVec2;
use hf_solver::policy::{
    BoundaryCondition, CellwiseInitial, ConstantTimeStep, FluxContext, FluxFunction, PolicySet,
};

/// 标量线性对流的迎风通量
#[derive(Debug, Clone, Copy)]
pub struct UpwindAdvection {
    pub velocity: DVec2,
}

impl FluxFunction for UpwindAdvection {
    fn compute_flux(&self, ctx: &FluxContext<'_>, flux: &mut [f64]) {
        let un = self.velocity.dot(ctx.normal);
        flux[0] = if un >= 0.0 { un * ctx.q_i[0] } else { un * ctx.q_j[0] };
    }

    fn name(&self) -> &'static str {
        "upwind"
    }
}

/// 线性扩散型通量 `f = κ (q_i - q_j)`
#[derive(Debug, Clone, Copy)]
pub struct Diffusion {
    pub kappa: f64,
}

impl FluxFunction for Diffusion {
    fn compute_flux(&self, ctx: &FluxContext<'_>, flux: &mut [f64]) {
        for k in 0..flux.len() {
            flux[k] = self.kappa * (ctx.q_i[k] - ctx.q_j[k]);
        }
    }

    fn name(&self) -> &'static str {
        "diffusion"
    }
}

/// 零梯度外推
#[derive(Debug, Clone, Copy)]
pub struct Extrapolate;

impl BoundaryCondition for Extrapolate {
    fn ghost_state(&self, interior: &[f64], _normal: DVec2, ghost: &mut [f64]) {
        ghost.copy_from_slice(interior);
    }

    fn name(&self) -> &'static str {
        "extrapolate"
    }
}

/// 光滑的初始凸包
pub fn bump(p: DVec2, q: &mut [f64]) {
    let r2 = (p - DVec2::new(0.4, 0.5)).length_squared();
    q[0] = 1.0 + (-r2 / 0.02).exp();
}

/// 阶跃初值
pub fn step(p: DVec2, q: &mut [f64]) {
    q[0] = if p.x < 0.5 { 1.0 } else { 0.1 };
}

/// 对流模型
pub fn advection(dt: f64) -> PolicySet {
    PolicySet::builder(1)
        .variable_names(["phi"])
        .flux(UpwindAdvection {
            velocity: DVec2::new(1.0, 0.5),
        })
        .boundary("wall", Extrapolate)
        .time_step(ConstantTimeStep::new(dt))
        .initial(CellwiseInitial::new("bump", bump))
        .build()
        .unwrap()
}

/// 扩散模型
pub fn diffusion(dt: f64) -> PolicySet {
    PolicySet::builder(1)
        .flux(Diffusion { kappa: 0.3 })
        .boundary("wall", Extrapolate)
        .time_step(ConstantTimeStep::new(dt))
        .initial(CellwiseInitial::new("step", step))
        .build()
        .unwrap()
}

/// 线程间共享的输出缓冲
#[derive(Clone, Default)]
pub struct SharedBuffer(pub Arc<parking_lot::Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

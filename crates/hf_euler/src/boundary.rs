// crates/hf_euler/src/boundary.rs

//! Euler 方程边界条件
//!
//! 全部条件都通过 ghost 单元状态施加，界面通量仍由 Roe 通量计算。

use glam::DVec2;

use hf_solver::policy::BoundaryCondition;

use crate::gas::{IdealGas, VARS};

// ============================================================
// 零梯度
// ============================================================

/// 零梯度外推：ghost 复制内部状态
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroFlux;

impl BoundaryCondition for ZeroFlux {
    fn ghost_state(&self, interior: &[f64], _normal: DVec2, ghost: &mut [f64]) {
        ghost.copy_from_slice(interior);
    }

    fn name(&self) -> &'static str {
        "zero_flux"
    }
}

// ============================================================
// 滑移壁面
// ============================================================

/// 无粘滑移壁面：反射法向动量 `m_b = m - 2n(n·m)`
#[derive(Debug, Clone, Copy, Default)]
pub struct SlipWall;

impl BoundaryCondition for SlipWall {
    fn ghost_state(&self, q: &[f64], n: DVec2, b: &mut [f64]) {
        let mn = n.x * q[1] + n.y * q[2];
        b[0] = q[0];
        b[1] = q[1] - 2.0 * n.x * mn;
        b[2] = q[2] - 2.0 * n.y * mn;
        b[3] = q[3];
    }

    fn name(&self) -> &'static str {
        "wall"
    }

    fn vars(&self) -> Option<usize> {
        Some(VARS)
    }
}

// ============================================================
// 特征入口/出口
// ============================================================

/// 基于来流状态的特征入口/出口
///
/// | 流态 | 入口 (u·n < 0) | 出口 |
/// |------|----------------|------|
/// | 超声速 | 来流状态 | 内部外推 |
/// | 亚声速 | 来流 ρ、u，内部压力 | 来流压力，其余按特征关系修正 |
#[derive(Debug, Clone, Copy)]
pub struct InletOutlet {
    gas: IdealGas,
    freestream: [f64; VARS],
}

impl InletOutlet {
    /// 以来流守恒状态创建
    pub fn new(gas: IdealGas, freestream: [f64; VARS]) -> Self {
        Self { gas, freestream }
    }

    /// 以来流马赫数创建（ρ = γ, p = 1，声速为 1）
    pub fn mach(gas: IdealGas, mach: f64) -> Self {
        Self::new(gas, gas.conserved(gas.gamma(), mach, 0.0, 1.0))
    }

    /// 来流状态
    pub fn freestream(&self) -> &[f64; VARS] {
        &self.freestream
    }
}

impl BoundaryCondition for InletOutlet {
    fn ghost_state(&self, q: &[f64], n: DVec2, b: &mut [f64]) {
        let gas = &self.gas;
        let gm1 = gas.gamma() - 1.0;
        let (u, v) = gas.velocity(q);
        let un = u * n.x + v * n.y;
        let p = gas.pressure(q);
        let c = (gas.gamma() * p / q[0]).sqrt();
        let mach = (u * u + v * v).sqrt() / c;
        let inflow = un < 0.0;

        if mach > 1.0 {
            if inflow {
                b.copy_from_slice(&self.freestream);
            } else {
                b.copy_from_slice(q);
            }
            return;
        }

        if inflow {
            b[..3].copy_from_slice(&self.freestream[..3]);
            b[3] = p / gm1 + 0.5 / b[0] * (b[1] * b[1] + b[2] * b[2]);
        } else {
            let pb = gas.pressure(&self.freestream);
            let rc = q[0] * c;
            b[0] = q[0] + (pb - p) / (c * c);
            b[1] = b[0] * (u + n.x * (p - pb) / rc);
            b[2] = b[0] * (v + n.y * (p - pb) / rc);
            b[3] = pb / gm1 + 0.5 / b[0] * (b[1] * b[1] + b[2] * b[2]);
        }
    }

    fn name(&self) -> &'static str {
        "inlet_outlet"
    }

    fn vars(&self) -> Option<usize> {
        Some(VARS)
    }
}

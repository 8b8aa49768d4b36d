// crates/hf_euler/src/output.rs

//! 后处理输出量

use hf_solver::policy::OutputQuantity;

use crate::gas::{IdealGas, VARS};

/// 压力
#[derive(Debug, Clone, Copy, Default)]
pub struct Pressure(pub IdealGas);

impl OutputQuantity for Pressure {
    fn name(&self) -> &str {
        "p"
    }

    fn evaluate(&self, q: &[f64], out: &mut [f64]) {
        out[0] = self.0.pressure(q);
    }

    fn vars(&self) -> Option<usize> {
        Some(VARS)
    }
}

/// 速度矢量
#[derive(Debug, Clone, Copy, Default)]
pub struct Velocity;

impl OutputQuantity for Velocity {
    fn name(&self) -> &str {
        "U"
    }

    fn components(&self) -> usize {
        2
    }

    fn evaluate(&self, q: &[f64], out: &mut [f64]) {
        out[0] = q[1] / q[0];
        out[1] = q[2] / q[0];
    }

    fn vars(&self) -> Option<usize> {
        Some(VARS)
    }
}

/// 马赫数
#[derive(Debug, Clone, Copy, Default)]
pub struct MachNumber(pub IdealGas);

impl OutputQuantity for MachNumber {
    fn name(&self) -> &str {
        "mach"
    }

    fn evaluate(&self, q: &[f64], out: &mut [f64]) {
        let speed = q[1].hypot(q[2]) / q[0];
        out[0] = speed / self.0.sound_speed(q);
    }

    fn vars(&self) -> Option<usize> {
        Some(VARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outputs() {
        let gas = IdealGas::default();
        let q = gas.conserved(1.4, 3.0, 4.0, 1.0);
        let mut out = [0.0; 2];

        Pressure(gas).evaluate(&q, &mut out[..1]);
        assert!((out[0] - 1.0).abs() < 1e-12);

        Velocity.evaluate(&q, &mut out);
        assert!((out[0] - 3.0).abs() < 1e-14 && (out[1] - 4.0).abs() < 1e-14);

        MachNumber(gas).evaluate(&q, &mut out[..1]);
        assert!((out[0] - 5.0).abs() < 1e-12);
    }
}

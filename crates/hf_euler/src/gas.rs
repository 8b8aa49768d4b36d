// crates/hf_euler/src/gas.rs

//! 理想气体状态方程

/// 每单元守恒变量数
pub const VARS: usize = 4;

/// 空气比热比
pub const GAMMA_AIR: f64 = 1.4;

/// 守恒变量名
pub const EULER_VARIABLES: [&str; VARS] = ["rho", "rhou", "rhov", "rhoe"];

/// 理想气体
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdealGas {
    gamma: f64,
}

impl Default for IdealGas {
    fn default() -> Self {
        Self::new(GAMMA_AIR)
    }
}

impl IdealGas {
    /// 以比热比创建
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    /// 比热比 γ
    #[inline]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// 压力 `p = (γ-1)(ρE - ½(ρu² + ρv²)/ρ)`
    #[inline]
    pub fn pressure(&self, q: &[f64]) -> f64 {
        (self.gamma - 1.0) * (q[3] - 0.5 / q[0] * (q[1] * q[1] + q[2] * q[2]))
    }

    /// 声速 `c = sqrt(γp/ρ)`
    #[inline]
    pub fn sound_speed(&self, q: &[f64]) -> f64 {
        (self.gamma * self.pressure(q) / q[0]).sqrt()
    }

    /// 速度
    #[inline]
    pub fn velocity(&self, q: &[f64]) -> (f64, f64) {
        (q[1] / q[0], q[2] / q[0])
    }

    /// 由原始变量 `(ρ, u, v, p)` 构造守恒变量
    pub fn conserved(&self, rho: f64, u: f64, v: f64, p: f64) -> [f64; VARS] {
        [
            rho,
            rho * u,
            rho * v,
            p / (self.gamma - 1.0) + 0.5 * rho * (u * u + v * v),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_round_trip() {
        let gas = IdealGas::default();
        let q = gas.conserved(1.4, 3.0, -0.5, 1.0);
        assert!((gas.pressure(&q) - 1.0).abs() < 1e-13);
        let (u, v) = gas.velocity(&q);
        assert!((u - 3.0).abs() < 1e-14);
        assert!((v + 0.5).abs() < 1e-14);
        // ρ = γ, p = 1 时 c = 1
        assert!((gas.sound_speed(&q) - 1.0).abs() < 1e-13);
    }
}

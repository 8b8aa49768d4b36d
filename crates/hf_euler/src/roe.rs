// crates/hf_euler/src/roe.rs

//! Roe 通量差分裂
//!
//! ```text
//! F* = ½(F(q_L) + F(q_R)) - ½ Σ |λ_k| α_k r_k
//! ```
//!
//! 声波特征值取 `|min(V-c, V_L-c)|` 与 `|max(V+c, V_R+c)|`，
//! 即对 Roe 平均特征值与左右单侧特征值取包络，消除跨声速膨胀处的
//! 非物理膨胀激波。

use hf_solver::policy::{FluxContext, FluxFunction};

use crate::gas::{IdealGas, VARS};

/// Roe 通量
#[derive(Debug, Clone, Copy, Default)]
pub struct RoeFlux {
    gas: IdealGas,
}

impl RoeFlux {
    /// 创建 Roe 通量
    pub fn new(gas: IdealGas) -> Self {
        Self { gas }
    }

    /// 气体模型
    pub fn gas(&self) -> IdealGas {
        self.gas
    }

    /// 沿单位法向 `n` 计算界面通量
    pub fn flux(&self, ql: &[f64], qr: &[f64], n: [f64; 2], f: &mut [f64]) {
        let gm1 = self.gas.gamma() - 1.0;
        let pl = self.gas.pressure(ql);
        let pr = self.gas.pressure(qr);

        let (ul, vl) = (ql[1] / ql[0], ql[2] / ql[0]);
        let (ur, vr) = (qr[1] / qr[0], qr[2] / qr[0]);
        let vnl = ul * n[0] + vl * n[1];
        let vnr = ur * n[0] + vr * n[1];

        // 中心通量
        f[0] = 0.5 * (ql[0] * vnl + qr[0] * vnr);
        f[1] = 0.5 * (ql[1] * vnl + pl * n[0] + qr[1] * vnr + pr * n[0]);
        f[2] = 0.5 * (ql[2] * vnl + pl * n[1] + qr[2] * vnr + pr * n[1]);
        f[3] = 0.5 * ((ql[3] + pl) * vnl + (qr[3] + pr) * vnr);

        // Roe 平均
        let sl = ql[0].sqrt();
        let sr = qr[0].sqrt();
        let inv = 1.0 / (sl + sr);
        let rho = sl * sr;
        let u = (ul * sl + ur * sr) * inv;
        let v = (vl * sl + vr * sr) * inv;
        let h = ((ql[3] + pl) / ql[0] * sl + (qr[3] + pr) / qr[0] * sr) * inv;
        let q2 = u * u + v * v;
        let c = (gm1 * (h - 0.5 * q2)).sqrt();
        let vn = u * n[0] + v * n[1];

        let lambda_m = (vn - c).min(vnl - c).abs();
        let lambda_0 = vn.abs();
        let lambda_p = (vn + c).max(vnr + c).abs();

        let dp = pr - pl;
        let dvn = vnr - vnl;
        let c2 = c * c;

        let k1 = lambda_m * (dp - rho * c * dvn) / (2.0 * c2);
        let k2 = lambda_0 * ((qr[0] - ql[0]) - dp / c2);
        let k3 = lambda_0 * rho;
        let k4 = lambda_p * (dp + rho * c * dvn) / (2.0 * c2);

        let du = ur - ul;
        let dv = vr - vl;

        f[0] -= 0.5 * (k1 + k2 + k4);
        f[1] -= 0.5 * (k1 * (u - c * n[0]) + k2 * u + k3 * (du - dvn * n[0]) + k4 * (u + c * n[0]));
        f[2] -= 0.5 * (k1 * (v - c * n[1]) + k2 * v + k3 * (dv - dvn * n[1]) + k4 * (v + c * n[1]));
        f[3] -= 0.5
            * (k1 * (h - c * vn)
                + k2 * 0.5 * q2
                + k3 * (u * du + v * dv - vn * dvn)
                + k4 * (h + c * vn));
    }
}

impl FluxFunction for RoeFlux {
    fn compute_flux(&self, ctx: &FluxContext<'_>, flux: &mut [f64]) {
        self.flux(ctx.q_i, ctx.q_j, [ctx.normal.x, ctx.normal.y], flux);
    }

    fn name(&self) -> &'static str {
        "roe"
    }

    fn vars(&self) -> Option<usize> {
        Some(VARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 物理通量
    fn physical(gas: &IdealGas, q: &[f64], n: [f64; 2]) -> [f64; 4] {
        let p = gas.pressure(q);
        let vn = (q[1] * n[0] + q[2] * n[1]) / q[0];
        [
            q[0] * vn,
            q[1] * vn + p * n[0],
            q[2] * vn + p * n[1],
            (q[3] + p) * vn,
        ]
    }

    #[test]
    fn test_consistency() {
        let gas = IdealGas::default();
        let roe = RoeFlux::new(gas);
        let q = gas.conserved(1.2, 0.7, -0.3, 2.0);
        let n = [0.6, 0.8];

        let mut f = [0.0; 4];
        roe.flux(&q, &q, n, &mut f);
        let expected = physical(&gas, &q, n);
        for k in 0..4 {
            assert!((f[k] - expected[k]).abs() < 1e-12, "component {k}");
        }
    }

    #[test]
    fn test_antisymmetry() {
        // F(qL, qR, n) = -F(qR, qL, -n)
        let gas = IdealGas::default();
        let roe = RoeFlux::new(gas);
        let ql = gas.conserved(1.0, 0.2, 0.1, 1.0);
        let qr = gas.conserved(0.125, -0.1, 0.0, 0.1);

        let mut a = [0.0; 4];
        let mut b = [0.0; 4];
        roe.flux(&ql, &qr, [1.0, 0.0], &mut a);
        roe.flux(&qr, &ql, [-1.0, 0.0], &mut b);
        for k in 0..4 {
            assert!((a[k] + b[k]).abs() < 1e-12, "component {k}");
        }
    }

    #[test]
    fn test_supersonic_upwinding() {
        // 左右均为超声速右行时，通量等于左侧物理通量
        let gas = IdealGas::default();
        let roe = RoeFlux::new(gas);
        let ql = gas.conserved(1.4, 3.0, 0.0, 1.0);
        let qr = gas.conserved(1.5, 2.9, 0.0, 1.1);

        let mut f = [0.0; 4];
        roe.flux(&ql, &qr, [1.0, 0.0], &mut f);
        let expected = physical(&gas, &ql, [1.0, 0.0]);
        for k in 0..4 {
            assert!((f[k] - expected[k]).abs() < 1e-10, "component {k}");
        }
    }

    #[test]
    fn test_sod_interface_pushes_mass_right() {
        let gas = IdealGas::default();
        let ql = gas.conserved(1.0, 0.0, 0.0, 1.0);
        let qr = gas.conserved(0.125, 0.0, 0.0, 0.1);
        let mut f = [0.0; 4];
        RoeFlux::new(gas).flux(&ql, &qr, [1.0, 0.0], &mut f);
        assert!(f[0] > 0.0);
        assert!(f[3] > 0.0);
        assert!(f[2].abs() < 1e-14);
    }
}

// crates/hf_solver/src/numerics/limiter/shapes.rs

//! 限制器形状函数
//!
//! 形状函数把比值 r = Δ/(∇q·d) 映射到 [0, 1]。r 为允许的变化量与
//! 梯度外推变化量之比，非负。

use super::LimiterShape;

/// 一阶格式：完全去掉梯度
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOrder;

impl LimiterShape for FirstOrder {
    #[inline]
    fn shape(&self, _ratio: f64) -> f64 {
        0.0
    }

    fn name(&self) -> &'static str {
        "first_order"
    }
}

/// 不限制
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

impl LimiterShape for Unlimited {
    #[inline]
    fn shape(&self, _ratio: f64) -> f64 {
        1.0
    }

    fn name(&self) -> &'static str {
        "unlimited"
    }
}

/// Barth-Jespersen: φ(r) = min(1, r)
#[derive(Debug, Clone, Copy, Default)]
pub struct BarthJespersen;

impl LimiterShape for BarthJespersen {
    #[inline]
    fn shape(&self, ratio: f64) -> f64 {
        ratio.clamp(0.0, 1.0)
    }

    fn name(&self) -> &'static str {
        "barth_jespersen"
    }
}

/// Venkatakrishnan 光滑形状: φ(r) = (r² + 2r) / (r² + r + 2)
///
/// 光滑阈值由 `LimiterEngine` 的混合因子处理，这里不再引入 ε。
/// r > 2 时 φ 略大于 1，由 `LimiterEngine` 截断。
#[derive(Debug, Clone, Copy, Default)]
pub struct Venkatakrishnan;

impl LimiterShape for Venkatakrishnan {
    #[inline]
    fn shape(&self, ratio: f64) -> f64 {
        let r = ratio.max(0.0);
        (r * r + 2.0 * r) / (r * r + r + 2.0)
    }

    fn name(&self) -> &'static str {
        "venkatakrishnan"
    }
}

/// Michalak 三次多项式形状
///
/// y < yt 时 φ(y) = a·y³ + b·y² + y，y ≥ yt 时为 1，在 yt 处一阶导数连续。
#[derive(Debug, Clone, Copy)]
pub struct Michalak {
    yt: f64,
    a: f64,
    b: f64,
}

impl Default for Michalak {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl Michalak {
    /// 以过渡点 `yt`（> 1）创建
    pub fn new(yt: f64) -> Self {
        let a = 1.0 / (yt * yt) - 2.0 / (yt * yt * yt);
        let b = -1.5 * a * yt - 0.5 / yt;
        Self { yt, a, b }
    }

    /// 过渡点
    pub fn yt(&self) -> f64 {
        self.yt
    }
}

impl LimiterShape for Michalak {
    #[inline]
    fn shape(&self, ratio: f64) -> f64 {
        if ratio >= self.yt {
            1.0
        } else {
            let y = ratio;
            self.a * y * y * y + self.b * y * y + y
        }
    }

    fn name(&self) -> &'static str {
        "michalak"
    }
}

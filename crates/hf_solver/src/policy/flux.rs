// crates/hf_solver/src/policy/flux.rs

//! 数值通量策略

use glam::DVec2;
use std::fmt::Debug;

/// 单条边上通量计算的输入
///
/// 开启线性重构时 `q_i`/`q_j` 为边两侧重构后的面状态，否则为单元平均值。
/// 梯度与限制器始终为单元中心值。所有切片长度均为 `vars`。
#[derive(Debug, Clone, Copy)]
pub struct FluxContext<'a> {
    /// i 侧状态
    pub q_i: &'a [f64],
    /// j 侧状态
    pub q_j: &'a [f64],
    /// i 单元 x 梯度
    pub gx_i: &'a [f64],
    /// i 单元 y 梯度
    pub gy_i: &'a [f64],
    /// j 单元 x 梯度
    pub gx_j: &'a [f64],
    /// j 单元 y 梯度
    pub gy_j: &'a [f64],
    /// i 单元限制器
    pub lim_i: &'a [f64],
    /// j 单元限制器
    pub lim_j: &'a [f64],
    /// 单位法向量（i → j）
    pub normal: DVec2,
    /// 边中心减 i 单元中心
    pub d_i: DVec2,
    /// 边中心减 j 单元中心
    pub d_j: DVec2,
    /// i 单元面积
    pub area_i: f64,
    /// 边长度
    pub length: f64,
}

/// 数值通量函数
///
/// 输出沿法向、单位边长的通量，积分器负责乘以边长并累加到两侧单元。
pub trait FluxFunction: Debug + Send + Sync {
    /// 计算通量写入 `flux`（长度 `vars`）
    fn compute_flux(&self, ctx: &FluxContext<'_>, flux: &mut [f64]);

    /// 名称
    fn name(&self) -> &'static str;

    /// 要求的变量数，`None` 表示适用于任意变量数
    fn vars(&self) -> Option<usize> {
        None
    }
}

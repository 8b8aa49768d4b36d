// crates/hf_solver/src/fields.rs

//! 每单元工作数组
//!
//! 所有数组长度均为 `vars * n_cells`，按单元连续存放。

/// 求解器工作数组
#[derive(Debug, Clone)]
pub struct SolverFields {
    /// 每单元变量数
    pub vars: usize,
    /// 单元数
    pub n_cells: usize,
    /// 守恒状态
    pub q: Vec<f64>,
    /// Runge-Kutta 级状态
    pub qk: Vec<f64>,
    /// 时间导数
    pub qt: Vec<f64>,
    /// x 梯度
    pub gx: Vec<f64>,
    /// y 梯度
    pub gy: Vec<f64>,
    /// 限制因子
    pub limiters: Vec<f64>,
    /// 邻域最小值
    pub qmin: Vec<f64>,
    /// 邻域最大值
    pub qmax: Vec<f64>,
    /// 局部时间步
    pub dt: Vec<f64>,
}

impl SolverFields {
    /// 分配全部数组
    ///
    /// 限制因子初始化为 1，未开启限制器时线性重构不受限制。
    pub fn new(vars: usize, n_cells: usize) -> Self {
        let n = vars * n_cells;
        Self {
            vars,
            n_cells,
            q: vec![0.0; n],
            qk: vec![0.0; n],
            qt: vec![0.0; n],
            gx: vec![0.0; n],
            gy: vec![0.0; n],
            limiters: vec![1.0; n],
            qmin: vec![0.0; n],
            qmax: vec![0.0; n],
            dt: vec![0.0; n],
        }
    }

    /// 数组长度
    #[inline]
    pub fn len(&self) -> usize {
        self.vars * self.n_cells
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 单元状态
    #[inline]
    pub fn cell_state(&self, cell: usize) -> &[f64] {
        &self.q[cell * self.vars..(cell + 1) * self.vars]
    }
}

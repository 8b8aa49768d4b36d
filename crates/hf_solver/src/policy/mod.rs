// crates/hf_solver/src/policy/mod.rs

//! 物理策略
//!
//! 求解器核心与具体物理无关，通量、边界、时间步、限制器形状、初始条件
//! 以及额外输出量都以 trait 对象注入。所有状态数据通过定长切片传递，
//! 切片长度等于变量数 `vars`。
//!
//! [`PolicySet`] 在积分器构建前组装完成；边界标签到策略对象的映射在
//! 积分器构建时解析为每条边界边的绑定，运行期间不再查表。

mod boundary;
mod flux;
mod initial;
mod output;
mod timestep;

pub use boundary::{BoundaryBinding, BoundaryCondition, BoundaryRegistry};
pub use flux::{FluxContext, FluxFunction};
pub use initial::{CellwiseInitial, InitialCondition, UniformState};
pub use output::{evaluate_output, OutputQuantity};
pub use timestep::{ConstantTimeStep, TimeStepPolicy};

use std::sync::Arc;

use hf_foundation::{HfError, HfResult};

use crate::numerics::limiter::{BarthJespersen, LimiterShape};

/// 一组完整的物理策略
///
/// 内部均为 `Arc`，克隆开销很小，多 rank 线程可各持一份。
#[derive(Debug, Clone)]
pub struct PolicySet {
    /// 每单元守恒变量数
    pub vars: usize,
    /// 变量名（用于进度输出表头）
    pub variable_names: Vec<String>,
    /// 数值通量
    pub flux: Arc<dyn FluxFunction>,
    /// 边界条件注册表
    pub boundaries: BoundaryRegistry,
    /// 时间步公式
    pub time_step: Arc<dyn TimeStepPolicy>,
    /// 限制器形状函数
    pub limiter: Arc<dyn LimiterShape>,
    /// 初始条件
    pub initial: Arc<dyn InitialCondition>,
    /// 额外输出量
    pub outputs: Vec<Arc<dyn OutputQuantity>>,
}

impl PolicySet {
    /// 创建构建器
    pub fn builder(vars: usize) -> PolicySetBuilder {
        PolicySetBuilder::new(vars)
    }

    /// 按名称查找输出量
    pub fn output(&self, name: &str) -> Option<&Arc<dyn OutputQuantity>> {
        self.outputs.iter().find(|o| o.name() == name)
    }

    /// 一致性检查
    pub fn validate(&self) -> HfResult<()> {
        if self.vars == 0 {
            return Err(HfError::configuration("变量数必须大于 0"));
        }
        HfError::check_size("variable_names", self.vars, self.variable_names.len())?;

        self.check_vars("数值通量", self.flux.name(), self.flux.vars())?;
        self.check_vars("时间步公式", self.time_step.name(), self.time_step.vars())?;
        self.check_vars("初始条件", self.initial.name(), self.initial.vars())?;
        for (tag, bc) in self.boundaries.iter() {
            self.check_vars(&format!("边界 '{tag}'"), bc.name(), bc.vars())?;
        }
        for o in &self.outputs {
            self.check_vars("输出量", o.name(), o.vars())?;
        }
        Ok(())
    }

    fn check_vars(&self, role: &str, name: &str, required: Option<usize>) -> HfResult<()> {
        match required {
            Some(n) if n != self.vars => Err(HfError::configuration(format!(
                "{role} '{name}' 需要 {n} 个变量，策略集为 {} 个",
                self.vars
            ))),
            _ => Ok(()),
        }
    }
}

/// PolicySet 构建器
#[derive(Debug)]
pub struct PolicySetBuilder {
    vars: usize,
    variable_names: Option<Vec<String>>,
    flux: Option<Arc<dyn FluxFunction>>,
    boundaries: BoundaryRegistry,
    time_step: Option<Arc<dyn TimeStepPolicy>>,
    limiter: Option<Arc<dyn LimiterShape>>,
    initial: Option<Arc<dyn InitialCondition>>,
    outputs: Vec<Arc<dyn OutputQuantity>>,
}

impl PolicySetBuilder {
    /// 创建构建器
    pub fn new(vars: usize) -> Self {
        Self {
            vars,
            variable_names: None,
            flux: None,
            boundaries: BoundaryRegistry::new(),
            time_step: None,
            limiter: None,
            initial: None,
            outputs: Vec::new(),
        }
    }

    /// 变量名
    pub fn variable_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.variable_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// 数值通量
    pub fn flux(mut self, flux: impl FluxFunction + 'static) -> Self {
        self.flux = Some(Arc::new(flux));
        self
    }

    /// 注册边界条件
    pub fn boundary(mut self, tag: impl Into<String>, bc: impl BoundaryCondition + 'static) -> Self {
        self.boundaries.register(tag, Arc::new(bc));
        self
    }

    /// 时间步公式
    pub fn time_step(mut self, policy: impl TimeStepPolicy + 'static) -> Self {
        self.time_step = Some(Arc::new(policy));
        self
    }

    /// 限制器形状函数（默认 Barth-Jespersen）
    pub fn limiter(mut self, shape: Arc<dyn LimiterShape>) -> Self {
        self.limiter = Some(shape);
        self
    }

    /// 初始条件
    pub fn initial(mut self, initial: impl InitialCondition + 'static) -> Self {
        self.initial = Some(Arc::new(initial));
        self
    }

    /// 追加输出量
    pub fn output(mut self, quantity: impl OutputQuantity + 'static) -> Self {
        self.outputs.push(Arc::new(quantity));
        self
    }

    /// 构建
    pub fn build(self) -> HfResult<PolicySet> {
        let missing = |what: &str| HfError::configuration(format!("策略集缺少{what}"));

        let variable_names = self
            .variable_names
            .unwrap_or_else(|| (0..self.vars).map(|k| format!("q[{k}]")).collect());

        let set = PolicySet {
            vars: self.vars,
            variable_names,
            flux: self.flux.ok_or_else(|| missing("数值通量"))?,
            boundaries: self.boundaries,
            time_step: self.time_step.ok_or_else(|| missing("时间步公式"))?,
            limiter: self.limiter.unwrap_or_else(|| Arc::new(BarthJespersen)),
            initial: self.initial.ok_or_else(|| missing("初始条件"))?,
            outputs: self.outputs,
        };
        set.validate()?;
        Ok(set)
    }
}

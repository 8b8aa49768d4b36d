// crates/hf_euler/src/problems.rs

//! 预置算例
//!
//! 每个算例给出矩形网格、求解器配置与完整的 Euler 策略集。
//!
//! | 算例 | 网格 | 边界 | 时间步 | 限制器 |
//! |------|------|------|--------|--------|
//! | `shock_tube` | 1.0 × 0.04 | 全部零梯度 | 常数 2e-5 | 一阶 |
//! | `supersonic_channel` | 3.0 × 1.0 | 左入口 / 右出口 / 上下滑移壁面 | CFL 1.5 | Michalak |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use hf_config::SolverConfig;
use hf_foundation::{HfError, HfResult};
use hf_mesh::{BoundaryTags, RectMeshGenerator};
use hf_solver::policy::{ConstantTimeStep, PolicySet};
use hf_solver::{create_limiter, LimiterType};

use crate::boundary::{InletOutlet, SlipWall, ZeroFlux};
use crate::gas::{IdealGas, EULER_VARIABLES, VARS};
use crate::initial::{Freestream, SodShockTube};
use crate::output::{MachNumber, Pressure, Velocity};
use crate::roe::RoeFlux;
use crate::timestep::CflTimeStep;

/// Sod 激波管的固定时间步
pub const SHOCK_TUBE_DT: f64 = 2e-5;

/// 超声速通道来流马赫数
pub const CHANNEL_MACH: f64 = 3.0;

/// 算例类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    /// Sod 激波管
    #[default]
    ShockTube,
    /// Mach 3 超声速通道
    SupersonicChannel,
}

impl ProblemKind {
    /// 全部算例
    pub const ALL: [ProblemKind; 2] = [Self::ShockTube, Self::SupersonicChannel];

    /// 名称
    pub fn name(self) -> &'static str {
        match self {
            Self::ShockTube => "shock_tube",
            Self::SupersonicChannel => "supersonic_channel",
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProblemKind {
    type Err = HfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| HfError::invalid_config("problem", s, "未知算例"))
    }
}

/// 一个完整算例
#[derive(Debug, Clone)]
pub struct Problem {
    /// 算例类型
    pub kind: ProblemKind,
    /// x 方向单元数
    pub nx: usize,
    /// y 方向单元数
    pub ny: usize,
    /// 区域长度
    pub lx: f64,
    /// 区域高度
    pub ly: f64,
    /// 边界标签
    pub tags: BoundaryTags,
    /// 求解器配置
    pub config: SolverConfig,
    /// 气体模型
    pub gas: IdealGas,
}

impl Problem {
    /// 按类型创建
    pub fn new(kind: ProblemKind) -> HfResult<Self> {
        match kind {
            ProblemKind::ShockTube => Self::shock_tube(),
            ProblemKind::SupersonicChannel => Self::supersonic_channel(),
        }
    }

    /// Sod 激波管
    pub fn shock_tube() -> HfResult<Self> {
        let config = SolverConfig::builder()
            .first_order()
            .max_steps(10_000)
            .max_time(0.2)
            .print_interval(100)
            .build()?;
        Ok(Self {
            kind: ProblemKind::ShockTube,
            nx: 100,
            ny: 4,
            lx: 1.0,
            ly: 0.04,
            tags: BoundaryTags::uniform("wall"),
            config,
            gas: IdealGas::default(),
        })
    }

    /// Mach 3 超声速通道
    pub fn supersonic_channel() -> HfResult<Self> {
        let config = SolverConfig::builder()
            .first_order()
            .max_steps(6000)
            .print_interval(10)
            .tolerance(1e-12)
            .snapshot_every_time(0.005)
            .build()?;
        Ok(Self {
            kind: ProblemKind::SupersonicChannel,
            nx: 90,
            ny: 30,
            lx: 3.0,
            ly: 1.0,
            tags: BoundaryTags {
                left: "inlet".to_string(),
                right: "outlet".to_string(),
                bottom: "wall".to_string(),
                top: "wall".to_string(),
            },
            config,
            gas: IdealGas::default(),
        })
    }

    /// 修改网格分辨率
    pub fn with_resolution(mut self, nx: usize, ny: usize) -> Self {
        self.nx = nx;
        self.ny = ny;
        self
    }

    /// 替换求解器配置
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// 网格生成器
    pub fn mesh(&self) -> RectMeshGenerator {
        RectMeshGenerator::new(self.nx, self.ny, self.lx, self.ly).with_tags(self.tags.clone())
    }

    /// 策略集
    pub fn policies(&self) -> HfResult<PolicySet> {
        let gas = self.gas;
        log::debug!("构建算例 {} 的策略集 (gamma = {})", self.kind, gas.gamma());
        let builder = PolicySet::builder(VARS)
            .variable_names(EULER_VARIABLES)
            .flux(RoeFlux::new(gas))
            .output(Pressure(gas))
            .output(Velocity);

        match self.kind {
            ProblemKind::ShockTube => builder
                .boundary("wall", ZeroFlux)
                .time_step(ConstantTimeStep::new(SHOCK_TUBE_DT))
                .limiter(create_limiter(LimiterType::FirstOrder))
                .initial(SodShockTube::new(gas, 0.5 * self.lx))
                .build(),
            ProblemKind::SupersonicChannel => builder
                .boundary("inlet", InletOutlet::mach(gas, CHANNEL_MACH))
                .boundary("outlet", InletOutlet::mach(gas, CHANNEL_MACH))
                .boundary("wall", SlipWall)
                .time_step(CflTimeStep::new(gas, CflTimeStep::DEFAULT_CFL))
                .limiter(create_limiter(LimiterType::Michalak))
                .initial(Freestream::mach(gas, CHANNEL_MACH))
                .output(MachNumber(gas))
                .build(),
        }
    }
}

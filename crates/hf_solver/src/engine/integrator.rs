// crates/hf_solver/src/engine/integrator.rs

//! 多级显式积分器
//!
//! 每次迭代：
//!
//! 1. 边界策略填充 ghost 单元
//! 2. 计算时间步（分布式时交换，全局模式取最小值）
//! 3. `qk = q`，对每个级系数 `a`：由 `qk` 计算梯度、限制因子和 `qt`，
//!    `qk = q + a·dt·qt`，分布式时交换 `qk`
//! 4. `q = qk`，按需归约残差并在根进程输出进度
//! 5. 步数加一，全局时间步模式下推进模拟时间
//!
//! 终止条件在每次迭代前按顺序检查：步数上限、时间上限、收敛。

use hf_comm::Communicator;
use hf_config::SolverConfig;
use hf_foundation::HfResult;
use hf_mesh::MeshPartition;

use super::boundary::BoundaryUpdater;
use super::flux_accumulator::{FluxAccumulator, FluxInputs};
use super::ghost_exchange::GhostExchange;
use super::progress::ProgressReporter;
use super::residual::ResidualReducer;
use super::snapshot::{NoSnapshots, Snapshot, SnapshotSchedule, SnapshotSink};
use super::timestep::TimeStepController;
use crate::fields::SolverFields;
use crate::numerics::{GreenGaussGradient, LimiterEngine};
use crate::policy::{evaluate_output, PolicySet};

// ============================================================
// 状态
// ============================================================

/// 积分器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorState {
    /// 尚未开始
    Init,
    /// 迭代中
    Iterating,
    /// 残差比低于容差
    Converged,
    /// 达到最大步数
    MaxStepReached,
    /// 达到最大模拟时间
    MaxTimeReached,
}

impl IntegratorState {
    /// 是否为终止状态
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Init | Self::Iterating)
    }
}

/// 终止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationStatus {
    /// 残差比低于容差
    Converged,
    /// 达到最大步数
    MaxStepReached,
    /// 达到最大模拟时间
    MaxTimeReached,
}

impl From<TerminationStatus> for IntegratorState {
    fn from(status: TerminationStatus) -> Self {
        match status {
            TerminationStatus::Converged => Self::Converged,
            TerminationStatus::MaxStepReached => Self::MaxStepReached,
            TerminationStatus::MaxTimeReached => Self::MaxTimeReached,
        }
    }
}

impl std::fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Converged => "converged",
            Self::MaxStepReached => "max steps reached",
            Self::MaxTimeReached => "max time reached",
        };
        f.write_str(s)
    }
}

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// 终止原因
    pub status: TerminationStatus,
    /// 完成的迭代步数
    pub steps: usize,
    /// 模拟时间
    pub time: f64,
    /// 最近一次残差比
    pub residuals: Vec<f64>,
}

// ============================================================
// 积分器
// ============================================================

/// 显式多级积分器
///
/// 每个进程持有一个实例，对本分区执行相同的控制流。
pub struct Integrator<'a, C: Communicator> {
    mesh: &'a MeshPartition,
    config: &'a SolverConfig,
    policies: PolicySet,
    comm: C,

    fields: SolverFields,
    boundaries: BoundaryUpdater,
    gradient: GreenGaussGradient,
    limiter: LimiterEngine,
    flux: FluxAccumulator,
    exchange: GhostExchange,
    time_step: TimeStepController,
    residual: ResidualReducer,
    reporter: ProgressReporter,

    state: IntegratorState,
    step: usize,
    time: f64,
    last_residual: Vec<f64>,
}

impl<'a, C: Communicator> std::fmt::Debug for Integrator<'a, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integrator")
            .field("comm", &self.comm.name())
            .field("rank", &self.comm.rank())
            .field("state", &self.state)
            .field("step", &self.step)
            .field("time", &self.time)
            .finish()
    }
}

impl<'a, C: Communicator> Integrator<'a, C> {
    /// 创建积分器
    ///
    /// 在此完成全部前置检查：网格完整性、配置、策略集、边界标签解析、
    /// 通信描述符的对端合法性。随后分配工作数组并应用初始条件。
    pub fn new(
        mesh: &'a MeshPartition,
        config: &'a SolverConfig,
        policies: PolicySet,
        comm: C,
    ) -> HfResult<Self> {
        mesh.validate()?;
        config.validate()?;
        policies.validate()?;

        let vars = policies.vars;
        let boundaries = BoundaryUpdater::new(&policies.boundaries, mesh)?;
        let exchange = GhostExchange::new(mesh, vars);
        exchange.check_peers(&comm)?;

        let mut fields = SolverFields::new(vars, mesh.n_cells);
        policies.initial.initialize(mesh, vars, &mut fields.q);
        fields.qk.copy_from_slice(&fields.q);

        let flux = FluxAccumulator::new(vars, config.linear_interpolation)
            .with_parallel(config.parallel_flux, config.parallel_threshold);

        let reporter = if comm.is_root() {
            ProgressReporter::stdout()
        } else {
            ProgressReporter::silent()
        };

        log::info!(
            "rank {}/{} 积分器就绪: {} 单元 ({} 实单元), {} 边, {} 条边界边, {} 个相邻分区, {} 级, 通量={}, 限制器={}",
            comm.rank(),
            comm.size(),
            mesh.n_cells,
            mesh.n_real_cells,
            mesh.n_edges(),
            boundaries.len(),
            exchange.n_neighbors(),
            config.stage_coefficients.len(),
            policies.flux.name(),
            policies.limiter.name(),
        );

        Ok(Self {
            mesh,
            config,
            comm,
            fields,
            boundaries,
            gradient: GreenGaussGradient::new(),
            limiter: LimiterEngine::new(config.limiter_k),
            flux,
            exchange,
            time_step: TimeStepController::new(config.global_dt),
            residual: ResidualReducer::new(vars),
            reporter,
            state: IntegratorState::Init,
            step: 0,
            time: 0.0,
            last_residual: vec![1.0; vars],
            policies,
        })
    }

    /// 替换进度输出器，非根进程始终静默
    pub fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
        if self.comm.is_root() {
            self.reporter = reporter;
        }
        self
    }

    // ========================================================
    // 访问器
    // ========================================================

    /// 当前状态
    pub fn state(&self) -> IntegratorState {
        self.state
    }

    /// 已完成的迭代步数
    pub fn step(&self) -> usize {
        self.step
    }

    /// 模拟时间
    pub fn time(&self) -> f64 {
        self.time
    }

    /// 最近一次残差比
    pub fn residuals(&self) -> &[f64] {
        &self.last_residual
    }

    /// 残差基准
    pub fn residual_baseline(&self) -> Option<&[f64]> {
        self.residual.baseline()
    }

    /// 守恒状态
    pub fn q(&self) -> &[f64] {
        &self.fields.q
    }

    /// 全部工作数组
    pub fn fields(&self) -> &SolverFields {
        &self.fields
    }

    /// 网格
    pub fn mesh(&self) -> &MeshPartition {
        self.mesh
    }

    /// 通信域
    pub fn comm(&self) -> &C {
        &self.comm
    }

    /// 策略集
    pub fn policies(&self) -> &PolicySet {
        &self.policies
    }

    /// 按名称计算输出量（全部实单元）
    pub fn output(&self, name: &str) -> Option<Vec<f64>> {
        self.policies
            .output(name)
            .map(|o| evaluate_output(o.as_ref(), self.mesh, self.policies.vars, &self.fields.q))
    }

    // ========================================================
    // 推进
    // ========================================================

    /// 终止判断
    pub fn termination(&self) -> Option<TerminationStatus> {
        if self.step >= self.config.max_steps {
            return Some(TerminationStatus::MaxStepReached);
        }
        if self.time >= self.config.max_time {
            return Some(TerminationStatus::MaxTimeReached);
        }
        let max_ratio = self.last_residual.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if self.step > 0 && max_ratio < self.config.tolerance {
            return Some(TerminationStatus::Converged);
        }
        None
    }

    /// 运行到终止
    pub fn run(&mut self) -> HfResult<RunOutcome> {
        self.run_with_snapshots(&mut NoSnapshots)
    }

    /// 运行到终止，并按配置把时序快照交给 `sink`
    pub fn run_with_snapshots(&mut self, sink: &mut dyn SnapshotSink) -> HfResult<RunOutcome> {
        let mut schedule = SnapshotSchedule::new(&self.config.snapshots);

        if self.state == IntegratorState::Init {
            self.start()?;
            if schedule.enabled() {
                sink.record(self.snapshot())?;
            }
        }

        let status = loop {
            if let Some(status) = self.termination() {
                break status;
            }
            self.iterate()?;
            if schedule.due(self.step, self.time) {
                sink.record(self.snapshot())?;
            }
        };
        self.state = status.into();

        log::info!(
            "rank {} 结束: {} (step={}, time={:e}, residuals={:?})",
            self.comm.rank(),
            status,
            self.step,
            self.time,
            self.last_residual
        );

        Ok(RunOutcome {
            status,
            steps: self.step,
            time: self.time,
            residuals: self.last_residual.clone(),
        })
    }

    /// 执行一次迭代（不检查终止条件）
    pub fn iterate(&mut self) -> HfResult<()> {
        if self.state == IntegratorState::Init {
            self.start()?;
        }
        let config = self.config;
        let vars = self.policies.vars;
        let step = self.step;

        self.boundaries.apply(vars, &mut self.fields.q);

        let global_dt = self.time_step.compute(
            step,
            &self.comm,
            self.mesh,
            vars,
            &self.fields.q,
            self.policies.time_step.as_ref(),
            &mut self.exchange,
            &mut self.fields.dt,
        )?;

        self.fields.qk.copy_from_slice(&self.fields.q);
        for &a in &config.stage_coefficients {
            self.evaluate_derivative(true)?;

            let f = &mut self.fields;
            for (((qk, q), dt), qt) in f.qk.iter_mut().zip(&f.q).zip(&f.dt).zip(&f.qt) {
                *qk = q + a * dt * qt;
            }
            if self.comm.is_distributed() {
                self.exchange.exchange(&self.comm, &mut self.fields.qk)?;
            }
        }
        self.fields.q.copy_from_slice(&self.fields.qk);

        if step == 0 || step % config.print_interval == 0 || config.tolerance_active() {
            self.last_residual = self.residual.ratio(step, &self.comm, self.mesh, &self.fields.qt)?;
        }
        if step > 0 && step % config.print_interval == 0 && self.comm.is_root() {
            self.reporter.row(step, self.time, &self.last_residual)?;
        }

        self.step += 1;
        if let Some(dt) = global_dt {
            self.time += dt;
        }
        Ok(())
    }

    /// 由当前状态计算时间导数 `qt`
    ///
    /// 先填充边界 ghost 单元，再按配置计算梯度与限制因子。
    pub fn time_derivative(&mut self) -> HfResult<&[f64]> {
        self.boundaries.apply(self.policies.vars, &mut self.fields.q);
        self.evaluate_derivative(false)?;
        Ok(&self.fields.qt)
    }

    // ========================================================
    // 内部
    // ========================================================

    fn start(&mut self) -> HfResult<()> {
        if self.comm.is_root() {
            self.reporter.header(&self.policies.variable_names)?;
        }
        self.state = IntegratorState::Iterating;
        log::debug!("rank {} 开始迭代", self.comm.rank());
        Ok(())
    }

    fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            step: self.step,
            time: self.time,
            vars: self.policies.vars,
            q: &self.fields.q,
            mesh: self.mesh,
        }
    }

    /// 梯度 → 限制因子 → 通量，`stage` 为真时以 `qk` 为输入
    fn evaluate_derivative(&mut self, stage: bool) -> HfResult<()> {
        let vars = self.policies.vars;
        let distributed = self.comm.is_distributed();
        let f = &mut self.fields;
        let state: &[f64] = if stage { &f.qk } else { &f.q };

        if self.config.compute_gradients {
            self.gradient.compute(self.mesh, vars, state, &mut f.gx, &mut f.gy);
            if distributed {
                self.exchange.exchange(&self.comm, &mut f.gx)?;
                self.exchange.exchange(&self.comm, &mut f.gy)?;
            }
        }

        if self.config.compute_limiters {
            self.limiter.compute(
                self.mesh,
                vars,
                state,
                &f.gx,
                &f.gy,
                self.policies.limiter.as_ref(),
                &mut f.qmin,
                &mut f.qmax,
                &mut f.limiters,
            );
            if distributed {
                self.exchange.exchange(&self.comm, &mut f.limiters)?;
            }
        }

        let inputs = FluxInputs {
            q: state,
            gx: &f.gx,
            gy: &f.gy,
            limiters: &f.limiters,
        };
        self.flux
            .compute(self.mesh, inputs, self.policies.flux.as_ref(), &mut f.qt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{BoundaryCondition, ConstantTimeStep, FluxContext, FluxFunction, UniformState};
    use glam::DVec2;
    use hf_comm::SerialComm;
    use hf_foundation::HfError;
    use hf_mesh::RectMeshGenerator;

    /// 零通量
    #[derive(Debug)]
    struct Still;

    impl FluxFunction for Still {
        fn compute_flux(&self, _ctx: &FluxContext<'_>, flux: &mut [f64]) {
            flux.fill(0.0);
        }

        fn name(&self) -> &'static str {
            "still"
        }
    }

    #[derive(Debug)]
    struct Mirror;

    impl BoundaryCondition for Mirror {
        fn ghost_state(&self, interior: &[f64], _normal: DVec2, ghost: &mut [f64]) {
            ghost.copy_from_slice(interior);
        }

        fn name(&self) -> &'static str {
            "mirror"
        }
    }

    fn policies() -> PolicySet {
        PolicySet::builder(1)
            .flux(Still)
            .time_step(ConstantTimeStep::new(0.1))
            .initial(UniformState::new([1.0]))
            .boundary("wall", Mirror)
            .build()
            .unwrap()
    }

    #[test]
    fn test_termination_order() {
        let mesh = RectMeshGenerator::new(2, 2, 1.0, 1.0).build().unwrap();
        let config = SolverConfig::builder()
            .max_steps(3)
            .max_time(0.15)
            .tolerance(0.0)
            .build().unwrap();
        let mut integ = Integrator::new(&mesh, &config, policies(), SerialComm::new())
            .unwrap()
            .with_reporter(ProgressReporter::silent());

        assert_eq!(integ.state(), IntegratorState::Init);
        let out = integ.run().unwrap();
        // 两步后 time = 0.2 ≥ 0.15
        assert_eq!(out.status, TerminationStatus::MaxTimeReached);
        assert_eq!(out.steps, 2);
        assert!((out.time - 0.2).abs() < 1e-14);
        assert!(integ.state().is_terminal());
    }

    #[test]
    fn test_zero_residual_converges() {
        let mesh = RectMeshGenerator::new(2, 1, 1.0, 1.0).build().unwrap();
        let config = SolverConfig::builder()
            .max_steps(10)
            .print_interval(1)
            .build()
            .unwrap();
        let mut integ = Integrator::new(&mesh, &config, policies(), SerialComm::new())
            .unwrap()
            .with_reporter(ProgressReporter::silent());

        // 第 0 步建立基准（比值为 1）；基准为 0 时之后报告绝对残差 0
        let out = integ.run().unwrap();
        assert_eq!(out.status, TerminationStatus::Converged);
        assert_eq!(out.steps, 2);
        assert_eq!(integ.state(), IntegratorState::Converged);
    }

    #[test]
    fn test_dangling_edge_rejected_before_run() {
        let mut mesh = RectMeshGenerator::new(2, 1, 1.0, 1.0).build().unwrap();
        mesh.edge_cells[0] = [0, 999];
        let config = SolverConfig::builder().build().unwrap();

        let err = Integrator::new(&mesh, &config, policies(), SerialComm::new()).unwrap_err();
        assert!(err.is_configuration(), "{err}");
    }

    #[test]
    fn test_truncated_geometry_rejected() {
        let mut mesh = RectMeshGenerator::new(2, 1, 1.0, 1.0).build().unwrap();
        mesh.cell_area.pop();
        let config = SolverConfig::builder().build().unwrap();

        let err = Integrator::new(&mesh, &config, policies(), SerialComm::new()).unwrap_err();
        assert!(matches!(err, HfError::SizeMismatch { .. }));
    }

    #[test]
    fn test_local_dt_does_not_advance_time() {
        let mesh = RectMeshGenerator::new(2, 1, 1.0, 1.0).build().unwrap();
        let config = SolverConfig::builder()
            .max_steps(4)
            .global_dt(false)
            .tolerance(0.0)
            .build().unwrap();
        let mut integ = Integrator::new(&mesh, &config, policies(), SerialComm::new())
            .unwrap()
            .with_reporter(ProgressReporter::silent());

        let out = integ.run().unwrap();
        assert_eq!(out.status, TerminationStatus::MaxStepReached);
        assert_eq!(out.steps, 4);
        assert_eq!(out.time, 0.0);
    }
}

// apps/hf_cli/src/commands/run.rs

//! 运行算例命令
//!
//! `--ranks 1` 时在当前线程上以串行通信域运行；大于 1 时把网格切分为
//! 列条带分区，每个 rank 在独立线程上运行，通过进程内通信域交换数据。

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{info, warn};

use hf_comm::{run_local, Communicator, SerialComm};
use hf_euler::{Problem, ProblemKind};
use hf_foundation::HfResult;
use hf_mesh::MeshPartition;
use hf_solver::{Integrator, RunOutcome, Snapshot, SnapshotSink};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 算例 (shock_tube, supersonic_channel)
    #[arg(short, long, default_value = "shock_tube", value_parser = super::parse_problem)]
    pub problem: ProblemKind,

    /// 求解器配置文件（JSON），替换算例的默认配置
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 进程内 rank 数
    #[arg(short = 'n', long, default_value = "1")]
    pub ranks: usize,

    /// x 方向单元数
    #[arg(long)]
    pub nx: Option<usize>,

    /// y 方向单元数
    #[arg(long)]
    pub ny: Option<usize>,

    /// 最大迭代步数
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// 最大模拟时间
    #[arg(long)]
    pub max_time: Option<f64>,

    /// 并行计算边通量
    #[arg(long)]
    pub parallel_flux: bool,

    /// 使用 MPI 后端（由 mpirun 启动，每个进程一个 rank）
    #[cfg(feature = "mpi")]
    #[arg(long)]
    pub mpi: bool,
}

/// 快照日志：记录帧数与每帧的密度范围
#[derive(Debug, Default)]
struct SnapshotLog {
    frames: usize,
}

impl SnapshotSink for SnapshotLog {
    fn record(&mut self, s: Snapshot<'_>) -> HfResult<()> {
        let (lo, hi) = s
            .mesh
            .owned_cells()
            .map(|c| s.q[c * s.vars])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        self.frames += 1;
        tracing::debug!("快照 #{}: step={}, t={:.6}, q[0] ∈ [{:.6}, {:.6}]", self.frames, s.step, s.time, lo, hi);
        Ok(())
    }
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== HyperFlux 模拟启动 ===");

    let mut problem = super::load_problem(args.problem, args.config.as_deref(), args.nx, args.ny)?;
    if let Some(steps) = args.max_steps {
        problem.config.max_steps = steps;
    }
    if let Some(time) = args.max_time {
        problem.config.max_time = time;
    }
    if args.parallel_flux {
        problem.config.parallel_flux = true;
    }
    problem.config.validate().context("求解器配置无效")?;

    info!(
        "算例: {}, 网格 {}x{} ({} x {}), 最大步数 {}, 最大时间 {}",
        problem.kind, problem.nx, problem.ny, problem.lx, problem.ly, problem.config.max_steps, problem.config.max_time
    );

    let start = Instant::now();

    #[cfg(feature = "mpi")]
    if args.mpi {
        let comm = hf_comm::MpiComm::initialize().context("MPI 初始化失败")?;
        let parts = problem.mesh().partition_columns(comm.size()).context("网格切分失败")?;
        let mesh = parts
            .get(comm.rank())
            .context("rank 没有对应的网格分区")?;
        let (outcome, frames) = run_rank(mesh, &problem, comm)?;
        report(&outcome, frames, start);
        return Ok(());
    }

    let (outcome, frames) = match args.ranks {
        0 => bail!("rank 数必须至少为 1"),
        1 => {
            let mesh = problem.mesh().build().context("网格生成失败")?;
            info!("网格: {}", mesh.statistics());
            run_rank(&mesh, &problem, SerialComm::new())?
        }
        n => {
            let parts = problem
                .mesh()
                .partition_columns(n)
                .with_context(|| format!("无法切分为 {n} 个分区"))?;
            for (rank, p) in parts.iter().enumerate() {
                info!("rank {} 分区: {}", rank, p.statistics());
            }

            let results = run_local(n, |comm| run_rank(&parts[comm.rank()], &problem, comm))
                .context("rank 线程异常退出")?;

            let mut first = None;
            for (rank, r) in results.into_iter().enumerate() {
                let r = r.with_context(|| format!("rank {rank} 运行失败"))?;
                if first.is_none() {
                    first = Some(r);
                }
            }
            first.context("没有任何 rank 返回结果")?
        }
    };

    report(&outcome, frames, start);
    Ok(())
}

fn run_rank<C: Communicator>(mesh: &MeshPartition, problem: &Problem, comm: C) -> Result<(RunOutcome, usize)> {
    let rank = comm.rank();
    let policies = problem.policies().context("策略集构建失败")?;
    let mut integ = Integrator::new(mesh, &problem.config, policies, comm)
        .with_context(|| format!("rank {rank} 积分器构建失败"))?;

    let mut log = SnapshotLog::default();
    let outcome = integ
        .run_with_snapshots(&mut log)
        .with_context(|| format!("rank {rank} 在第 {} 步失败", integ.step()))?;
    Ok((outcome, log.frames))
}

fn report(outcome: &RunOutcome, frames: usize, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    info!("=== 模拟完成 ===");
    info!("终止原因: {}", outcome.status);
    info!("总步数: {}, 模拟时间: {:.6}", outcome.steps, outcome.time);
    info!("残差比: {:?}", outcome.residuals);
    info!("快照数: {}", frames);
    info!("计算时间: {:.2} s", elapsed);
    if outcome.steps > 0 {
        info!("平均步耗时: {:.3} ms", elapsed * 1000.0 / outcome.steps as f64);
    } else {
        warn!("未执行任何迭代");
    }
}

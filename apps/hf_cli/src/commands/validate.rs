// apps/hf_cli/src/commands/validate.rs

//! 验证命令
//!
//! 检查求解器配置文件、网格分区文件，以及算例在指定 rank 数下的切分
//! 与边界标签解析。

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use hf_comm::{LocalUniverse, Communicator};
use hf_config::SolverConfig;
use hf_euler::ProblemKind;
use hf_mesh::MeshPartition;
use hf_solver::GhostExchange;

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 求解器配置文件（JSON）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 网格分区文件（JSON）
    #[arg(short, long)]
    pub mesh: Option<PathBuf>,

    /// 检查的算例
    #[arg(short, long, value_parser = super::parse_problem)]
    pub problem: Option<ProblemKind>,

    /// 算例切分的 rank 数
    #[arg(short = 'n', long, default_value = "1")]
    pub ranks: usize,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self, strict: bool) -> bool {
        self.errors.is_empty() && (!strict || self.warnings.is_empty())
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== HyperFlux 验证 ===");

    if args.config.is_none() && args.mesh.is_none() && args.problem.is_none() {
        println!("用法: hf_cli validate --config <配置文件> [--mesh <网格文件>] [--problem <算例> --ranks <N>]");
        return Ok(());
    }

    let mut result = ValidationResult::default();
    if let Some(path) = &args.config {
        validate_config(path, &mut result);
    }
    if let Some(path) = &args.mesh {
        validate_mesh(path, &mut result);
    }
    if let Some(kind) = args.problem {
        validate_problem(kind, args.config.as_deref(), args.ranks, &mut result);
    }

    for w in &result.warnings {
        println!("  ⚠ {w}");
    }
    for e in &result.errors {
        println!("  ✗ {e}");
    }

    if result.is_ok(args.strict) {
        println!("\n验证通过 ({} 个警告)", result.warnings.len());
        Ok(())
    } else {
        bail!(
            "验证失败: {} 个错误, {} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}

fn validate_config(path: &Path, result: &mut ValidationResult) {
    println!("\n检查配置文件: {}", path.display());
    match SolverConfig::from_file(path) {
        Ok(config) => {
            if config.stage_coefficients.last().map_or(false, |&a| (a - 1.0).abs() > 1e-12) {
                result.add_warning("最后一级系数不为 1，单步推进不是完整时间步");
            }
            if config.tolerance_active() && config.print_interval > 1 {
                info!("容差已启用，每步计算残差");
            }
            if config.parallel_flux && config.parallel_threshold == 0 {
                result.add_warning("parallel_threshold = 0，所有网格都使用并行通量");
            }
            println!("  ✓ 配置有效");
        }
        Err(e) => result.add_error(format!("配置无效: {e}")),
    }
}

fn validate_mesh(path: &Path, result: &mut ValidationResult) {
    println!("\n检查网格文件: {}", path.display());
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            result.add_error(format!("无法读取网格文件: {e}"));
            return;
        }
    };
    match MeshPartition::from_json(&content) {
        Ok(mesh) => {
            println!("  ✓ {}", mesh.statistics());
            if mesh.boundary_edges.is_empty() && !mesh.has_comms() {
                result.add_warning("网格既没有边界边也没有通信描述符");
            }
        }
        Err(e) => result.add_error(format!("网格无效: {e}")),
    }
}

fn validate_problem(kind: ProblemKind, config: Option<&Path>, ranks: usize, result: &mut ValidationResult) {
    println!("\n检查算例: {kind} ({ranks} 个 rank)");
    let problem = match super::load_problem(kind, config, None, None) {
        Ok(p) => p,
        Err(e) => {
            result.add_error(format!("{e:#}"));
            return;
        }
    };
    let policies = match problem.policies() {
        Ok(p) => p,
        Err(e) => {
            result.add_error(format!("策略集无效: {e}"));
            return;
        }
    };
    let parts = match problem.mesh().partition_columns(ranks) {
        Ok(p) => p,
        Err(e) => {
            result.add_error(format!("切分失败: {e}"));
            return;
        }
    };
    let comms = match LocalUniverse::create(ranks) {
        Ok(c) => c,
        Err(e) => {
            result.add_error(format!("{e}"));
            return;
        }
    };

    for (mesh, comm) in parts.iter().zip(&comms) {
        let rank = comm.rank();
        if let Err(e) = policies.boundaries.resolve(mesh) {
            result.add_error(format!("rank {rank}: {e}"));
        }
        if let Err(e) = GhostExchange::new(mesh, policies.vars).check_peers(comm) {
            result.add_error(format!("rank {rank}: {e}"));
        }
        println!("  rank {rank}: {}", mesh.statistics());
    }
}

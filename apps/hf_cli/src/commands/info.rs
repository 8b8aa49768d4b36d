// apps/hf_cli/src/commands/info.rs

//! 算例信息命令

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hf_euler::{Problem, ProblemKind};

/// 信息参数
#[derive(Args)]
pub struct InfoArgs {
    /// 只显示指定算例
    #[arg(short, long, value_parser = super::parse_problem)]
    pub problem: Option<ProblemKind>,

    /// 把算例的默认求解器配置写入 JSON 文件
    #[arg(long, requires = "problem")]
    pub dump_config: Option<PathBuf>,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    let kinds: Vec<ProblemKind> = match args.problem {
        Some(kind) => vec![kind],
        None => ProblemKind::ALL.to_vec(),
    };

    println!("HyperFlux {}", env!("CARGO_PKG_VERSION"));
    for kind in kinds {
        let problem = Problem::new(kind)?;
        print_problem(&problem)?;

        if let Some(path) = &args.dump_config {
            problem
                .config
                .save_to_file(path)
                .with_context(|| format!("无法写入配置文件: {}", path.display()))?;
            println!("  配置已写入 {}", path.display());
        }
    }
    Ok(())
}

fn print_problem(problem: &Problem) -> Result<()> {
    let policies = problem.policies()?;
    let c = &problem.config;

    println!("\n[{}]", problem.kind);
    println!("  网格:     {}x{} 单元, {} x {}", problem.nx, problem.ny, problem.lx, problem.ly);
    println!(
        "  边界:     左={} 右={} 下={} 上={}",
        problem.tags.left, problem.tags.right, problem.tags.bottom, problem.tags.top
    );
    println!("  变量:     {}", policies.variable_names.join(", "));
    println!(
        "  策略:     通量={} 时间步={} 限制器={} 初值={}",
        policies.flux.name(),
        policies.time_step.name(),
        policies.limiter.name(),
        policies.initial.name()
    );
    let outputs: Vec<&str> = policies.outputs.iter().map(|o| o.name()).collect();
    println!("  输出量:   {}", outputs.join(", "));
    println!(
        "  求解器:   max_steps={} max_time={} tolerance={:e} 级数={} 全局时间步={}",
        c.max_steps,
        c.max_time,
        c.tolerance,
        c.stage_coefficients.len(),
        c.global_dt
    );
    Ok(())
}

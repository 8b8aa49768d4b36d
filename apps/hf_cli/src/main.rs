// apps/hf_cli/src/main.rs

//! HyperFlux 命令行界面
//!
//! ```text
//! hf_cli run --problem shock_tube --ranks 4
//! hf_cli info --problem supersonic_channel --dump-config channel.json
//! hf_cli validate --problem shock_tube --ranks 3 --strict
//! ```

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// 显式有限体积求解器：在进程内 rank 或 MPI 进程上推进预置算例
#[derive(Parser)]
#[command(name = "hf_cli", version, about, long_about = None)]
struct Cli {
    /// 默认日志过滤级别，设置 RUST_LOG 时以环境变量为准
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 推进算例直到收敛或达到步数/时间上限
    Run(commands::run::RunArgs),
    /// 列出预置算例的网格、策略与求解器参数
    Info(commands::info::InfoArgs),
    /// 检查配置文件、网格文件与分区
    Validate(commands::validate::ValidateArgs),
}

/// RUST_LOG 优先，否则使用命令行给出的级别；库中的 log 宏经由 tracing-log 转发
fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow::anyhow!("无效的日志级别 '{level}': {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}

// apps/hf_cli/src/commands/mod.rs

//! 子命令

pub mod info;
pub mod run;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use hf_config::SolverConfig;
use hf_euler::{Problem, ProblemKind};

/// 解析算例名称
pub(crate) fn parse_problem(s: &str) -> Result<ProblemKind, String> {
    s.parse::<ProblemKind>().map_err(|e| e.to_string())
}

/// 构建算例，可选地以 JSON 文件替换求解器配置并修改分辨率
pub(crate) fn load_problem(
    kind: ProblemKind,
    config: Option<&Path>,
    nx: Option<usize>,
    ny: Option<usize>,
) -> Result<Problem> {
    let mut problem = Problem::new(kind).with_context(|| format!("无法创建算例 {kind}"))?;

    if let Some(path) = config {
        let config = SolverConfig::from_file(path)
            .with_context(|| format!("无法加载求解器配置: {}", path.display()))?;
        problem = problem.with_config(config);
    }

    let nx = nx.unwrap_or(problem.nx);
    let ny = ny.unwrap_or(problem.ny);
    Ok(problem.with_resolution(nx, ny))
}

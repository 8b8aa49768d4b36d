// crates/hf_config/src/solver_config.rs

//! SolverConfig - 显式时间推进求解器配置
//!
//! 定义积分器的全部运行参数：终止条件、残差监控、Runge-Kutta 级系数、
//! 梯度/限制器开关以及时序快照选项。配置可通过 JSON 文件加载和保存，
//! 在构建积分器之前调用 [`SolverConfig::validate`] 进行前置检查。

use serde::{Deserialize, Serialize};
use std::path::Path;

use hf_foundation::{HfError, HfResult};

/// 默认五级低存储 Runge-Kutta 系数
pub const DEFAULT_STAGE_COEFFICIENTS: [f64; 5] = [0.05, 0.125, 0.25, 0.5, 1.0];

/// 残差计算门限：容差高于该值时每步都计算残差
pub const TOLERANCE_ACTIVE_THRESHOLD: f64 = 1.01e-16;

// ============================================================
// 求解器配置
// ============================================================

/// 求解器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// 最大迭代步数
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// 最大模拟时间（仅全局时间步时推进）
    #[serde(default = "default_max_time")]
    pub max_time: f64,

    /// 收敛容差（残差比）
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// 进度输出间隔（步）
    #[serde(default = "default_print_interval")]
    pub print_interval: usize,

    /// 是否使用全局统一时间步
    #[serde(default = "default_true")]
    pub global_dt: bool,

    /// 是否计算梯度
    #[serde(default = "default_true")]
    pub compute_gradients: bool,

    /// 是否计算限制器
    #[serde(default = "default_true")]
    pub compute_limiters: bool,

    /// 是否进行线性面重构
    #[serde(default = "default_true")]
    pub linear_interpolation: bool,

    /// 限制器光滑阈值系数 K（Ka = K·sqrt(area)）
    #[serde(default = "default_limiter_k")]
    pub limiter_k: f64,

    /// Runge-Kutta 级系数
    #[serde(default = "default_stage_coefficients")]
    pub stage_coefficients: Vec<f64>,

    /// 时序快照
    #[serde(default)]
    pub snapshots: SnapshotConfig,

    /// 是否并行计算边通量
    #[serde(default)]
    pub parallel_flux: bool,

    /// 并行阈值（边数）
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_max_steps() -> usize { 10_000 }
fn default_max_time() -> f64 { 1.0e12 }
fn default_tolerance() -> f64 { 1.0e-16 }
fn default_print_interval() -> usize { 100 }
fn default_true() -> bool { true }
fn default_limiter_k() -> f64 { 1.0 }
fn default_stage_coefficients() -> Vec<f64> { DEFAULT_STAGE_COEFFICIENTS.to_vec() }
fn default_parallel_threshold() -> usize { 4096 }

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            max_time: default_max_time(),
            tolerance: default_tolerance(),
            print_interval: default_print_interval(),
            global_dt: true,
            compute_gradients: true,
            compute_limiters: true,
            linear_interpolation: true,
            limiter_k: default_limiter_k(),
            stage_coefficients: default_stage_coefficients(),
            snapshots: SnapshotConfig::default(),
            parallel_flux: false,
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

/// 时序快照配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// 是否启用
    #[serde(default)]
    pub enabled: bool,

    /// 模拟时间间隔，0 表示不按时间触发
    #[serde(default)]
    pub time_interval: f64,

    /// 步数间隔，0 表示不按步数触发
    #[serde(default)]
    pub step_interval: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            time_interval: 0.0,
            step_interval: 0,
        }
    }
}

impl SolverConfig {
    /// 创建构建器
    pub fn builder() -> SolverConfigBuilder {
        SolverConfigBuilder::default()
    }

    /// 容差是否足够大，需要每步计算残差
    #[inline]
    pub fn tolerance_active(&self) -> bool {
        self.tolerance > TOLERANCE_ACTIVE_THRESHOLD
    }

    /// 从 JSON 文件加载并校验
    pub fn from_file<P: AsRef<Path>>(path: P) -> HfResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HfError::io_with_source(format!("无法读取配置文件 {}", path.display()), e)
        })?;
        let config = Self::from_json(&content)?;
        log::debug!("已加载求解器配置: {}", path.display());
        Ok(config)
    }

    /// 从 JSON 字符串解析并校验
    pub fn from_json(content: &str) -> HfResult<Self> {
        let config: SolverConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> HfResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> HfResult<()> {
        if self.print_interval == 0 {
            return Err(HfError::invalid_config(
                "print_interval",
                self.print_interval,
                "输出间隔必须大于 0",
            ));
        }

        if !(self.max_time > 0.0) {
            return Err(HfError::invalid_config(
                "max_time",
                self.max_time,
                "最大模拟时间必须为正",
            ));
        }

        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(HfError::invalid_config(
                "tolerance",
                self.tolerance,
                "容差必须为非负有限值",
            ));
        }

        if !(self.limiter_k > 0.0) || !self.limiter_k.is_finite() {
            return Err(HfError::invalid_config(
                "limiter_k",
                self.limiter_k,
                "限制器系数必须为正",
            ));
        }

        if self.stage_coefficients.is_empty() {
            return Err(HfError::invalid_config(
                "stage_coefficients",
                "[]",
                "至少需要一个 Runge-Kutta 级",
            ));
        }

        if let Some(a) = self
            .stage_coefficients
            .iter()
            .find(|a| !(**a > 0.0) || !a.is_finite())
        {
            return Err(HfError::invalid_config(
                "stage_coefficients",
                a,
                "级系数必须为正有限值",
            ));
        }

        if self.linear_interpolation && !self.compute_gradients {
            return Err(HfError::invalid_config(
                "linear_interpolation",
                true,
                "线性重构需要开启 compute_gradients",
            ));
        }

        if self.compute_limiters && !self.compute_gradients {
            return Err(HfError::invalid_config(
                "compute_limiters",
                true,
                "限制器需要开启 compute_gradients",
            ));
        }

        let snap = &self.snapshots;
        if snap.enabled {
            if !snap.time_interval.is_finite() || snap.time_interval < 0.0 {
                return Err(HfError::invalid_config(
                    "snapshots.time_interval",
                    snap.time_interval,
                    "快照时间间隔必须为非负有限值",
                ));
            }
            if snap.time_interval == 0.0 && snap.step_interval == 0 {
                return Err(HfError::invalid_config(
                    "snapshots",
                    "enabled",
                    "启用快照时需要设置 time_interval 或 step_interval",
                ));
            }
        }

        Ok(())
    }
}

// ============================================================
// 构建器
// ============================================================

/// SolverConfig 构建器
#[derive(Debug, Clone, Default)]
pub struct SolverConfigBuilder {
    config: SolverConfig,
}

impl SolverConfigBuilder {
    /// 最大步数
    pub fn max_steps(mut self, steps: usize) -> Self {
        self.config.max_steps = steps;
        self
    }

    /// 最大模拟时间
    pub fn max_time(mut self, time: f64) -> Self {
        self.config.max_time = time;
        self
    }

    /// 收敛容差
    pub fn tolerance(mut self, tol: f64) -> Self {
        self.config.tolerance = tol;
        self
    }

    /// 输出间隔
    pub fn print_interval(mut self, interval: usize) -> Self {
        self.config.print_interval = interval;
        self
    }

    /// 全局/局部时间步
    pub fn global_dt(mut self, enabled: bool) -> Self {
        self.config.global_dt = enabled;
        self
    }

    /// 梯度计算
    pub fn compute_gradients(mut self, enabled: bool) -> Self {
        self.config.compute_gradients = enabled;
        self
    }

    /// 限制器计算
    pub fn compute_limiters(mut self, enabled: bool) -> Self {
        self.config.compute_limiters = enabled;
        self
    }

    /// 线性面重构
    pub fn linear_interpolation(mut self, enabled: bool) -> Self {
        self.config.linear_interpolation = enabled;
        self
    }

    /// 一阶格式：关闭梯度、限制器与重构
    pub fn first_order(self) -> Self {
        self.compute_gradients(false)
            .compute_limiters(false)
            .linear_interpolation(false)
    }

    /// 限制器系数
    pub fn limiter_k(mut self, k: f64) -> Self {
        self.config.limiter_k = k;
        self
    }

    /// Runge-Kutta 级系数
    pub fn stage_coefficients(mut self, alpha: impl Into<Vec<f64>>) -> Self {
        self.config.stage_coefficients = alpha.into();
        self
    }

    /// 按模拟时间间隔保存快照
    pub fn snapshot_every_time(mut self, interval: f64) -> Self {
        self.config.snapshots.enabled = true;
        self.config.snapshots.time_interval = interval;
        self
    }

    /// 按步数间隔保存快照
    pub fn snapshot_every_steps(mut self, interval: usize) -> Self {
        self.config.snapshots.enabled = true;
        self.config.snapshots.step_interval = interval;
        self
    }

    /// 并行边通量
    pub fn parallel_flux(mut self, enabled: bool, threshold: usize) -> Self {
        self.config.parallel_flux = enabled;
        self.config.parallel_threshold = threshold;
        self
    }

    /// 构建并校验
    pub fn build(self) -> HfResult<SolverConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stage_coefficients, DEFAULT_STAGE_COEFFICIENTS.to_vec());
        assert!(!config.tolerance_active());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = SolverConfig::default();
        config.print_interval = 0;
        assert!(config.validate().is_err());

        let mut config = SolverConfig::default();
        config.stage_coefficients.clear();
        assert!(config.validate().is_err());

        let mut config = SolverConfig::default();
        config.stage_coefficients = vec![0.5, f64::NAN];
        assert!(config.validate().is_err());

        let mut config = SolverConfig::default();
        config.limiter_k = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dependent_switches() {
        let result = SolverConfig::builder()
            .compute_gradients(false)
            .linear_interpolation(true)
            .compute_limiters(false)
            .build();
        assert!(result.is_err(), "线性重构依赖梯度");

        let config = SolverConfig::builder().first_order().build().unwrap();
        assert!(!config.compute_gradients);
        assert!(!config.linear_interpolation);
    }

    #[test]
    fn test_snapshot_requires_trigger() {
        let mut config = SolverConfig::default();
        config.snapshots.enabled = true;
        assert!(config.validate().is_err());

        let config = SolverConfig::builder().snapshot_every_time(0.005).build().unwrap();
        assert!(config.snapshots.enabled);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SolverConfig::from_json(r#"{ "max_steps": 50, "tolerance": 1e-10 }"#).unwrap();
        assert_eq!(config.max_steps, 50);
        assert!(config.tolerance_active());
        assert_eq!(config.print_interval, 100);
        assert!(config.global_dt);
    }

    #[test]
    fn test_malformed_json() {
        let err = SolverConfig::from_json("{ max_steps: }").unwrap_err();
        assert!(matches!(err, HfError::Serialization { .. }));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solver.json");

        let config = SolverConfig::builder()
            .max_steps(42)
            .stage_coefficients(vec![1.0])
            .build()
            .unwrap();
        config.save_to_file(&path).unwrap();

        let loaded = SolverConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let err = SolverConfig::from_file("/nonexistent/solver.json").unwrap_err();
        assert!(matches!(err, HfError::Io { .. }));
    }
}

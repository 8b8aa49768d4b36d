// crates/hf_solver/src/engine/snapshot.rs

//! 时序快照
//!
//! 积分器按配置的模拟时间间隔或步数间隔，把当前状态交给调用方提供的
//! [`SnapshotSink`]。核心不写文件。

use hf_config::SnapshotConfig;
use hf_foundation::HfResult;
use hf_mesh::MeshPartition;

/// 一次快照
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    /// 迭代步
    pub step: usize,
    /// 模拟时间
    pub time: f64,
    /// 每单元变量数
    pub vars: usize,
    /// 状态数组
    pub q: &'a [f64],
    /// 网格
    pub mesh: &'a MeshPartition,
}

/// 快照接收方
pub trait SnapshotSink {
    /// 记录快照
    fn record(&mut self, snapshot: Snapshot<'_>) -> HfResult<()>;
}

/// 不记录
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSnapshots;

impl SnapshotSink for NoSnapshots {
    fn record(&mut self, _snapshot: Snapshot<'_>) -> HfResult<()> {
        Ok(())
    }
}

/// 内存中的快照序列（仅拥有单元的状态）
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshots {
    /// `(step, time, owned-cell state)`
    pub frames: Vec<(usize, f64, Vec<f64>)>,
}

impl SnapshotSink for MemorySnapshots {
    fn record(&mut self, s: Snapshot<'_>) -> HfResult<()> {
        let state = s
            .mesh
            .owned_cells()
            .flat_map(|c| s.q[c * s.vars..(c + 1) * s.vars].iter().copied())
            .collect();
        self.frames.push((s.step, s.time, state));
        Ok(())
    }
}

/// 快照触发计划
#[derive(Debug, Clone)]
pub(crate) struct SnapshotSchedule {
    enabled: bool,
    time_interval: f64,
    step_interval: usize,
    next_time: f64,
}

impl SnapshotSchedule {
    pub(crate) fn new(config: &SnapshotConfig) -> Self {
        Self {
            enabled: config.enabled,
            time_interval: config.time_interval,
            step_interval: config.step_interval,
            next_time: config.time_interval,
        }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    /// 判断 `(step, time)` 是否需要快照，并推进下一个时间点
    pub(crate) fn due(&mut self, step: usize, time: f64) -> bool {
        if !self.enabled {
            return false;
        }
        let by_step = self.step_interval > 0 && step % self.step_interval == 0;
        let mut by_time = false;
        if self.time_interval > 0.0 && time >= self.next_time {
            by_time = true;
            while self.next_time <= time {
                self.next_time += self.time_interval;
            }
        }
        by_step || by_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_schedule() {
        let cfg = SnapshotConfig {
            enabled: true,
            time_interval: 0.1,
            step_interval: 0,
        };
        let mut s = SnapshotSchedule::new(&cfg);
        assert!(!s.due(1, 0.05));
        assert!(s.due(2, 0.12));
        assert!(!s.due(3, 0.15));
        // 一步跨过两个间隔只触发一次
        assert!(s.due(4, 0.41));
        assert!(!s.due(5, 0.45));
        assert!(s.due(6, 0.5));
    }

    #[test]
    fn test_step_schedule_and_disabled() {
        let mut s = SnapshotSchedule::new(&SnapshotConfig {
            enabled: true,
            time_interval: 0.0,
            step_interval: 3,
        });
        assert!(!s.due(1, 0.0));
        assert!(s.due(3, 0.0));

        let mut off = SnapshotSchedule::new(&SnapshotConfig::default());
        assert!(!off.enabled());
        assert!(!off.due(0, 0.0));
    }
}

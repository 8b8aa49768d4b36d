// crates/hf_comm/src/serial.rs

//! 单进程通信上下文

use hf_foundation::{HfError, HfResult};

use crate::communicator::Communicator;

/// 单进程通信上下文
///
/// rank 0 / size 1。集合操作在 size 为 1 时直接返回，因此不会触发点对点调用；
/// 若仍有点对点调用则说明网格带有通信描述符，返回通信错误。
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialComm;

impl SerialComm {
    /// 创建串行上下文
    pub fn new() -> Self {
        Self
    }
}

impl Communicator for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn send(&self, dest: usize, tag: i32, _data: &[f64]) -> HfResult<()> {
        Err(HfError::communication(format!(
            "串行上下文没有对端: send dest={dest} tag={tag}"
        )))
    }

    fn recv(&self, source: usize, tag: i32, _data: &mut [f64]) -> HfResult<()> {
        Err(HfError::communication(format!(
            "串行上下文没有对端: recv source={source} tag={tag}"
        )))
    }

    fn name(&self) -> &'static str {
        "serial"
    }
}

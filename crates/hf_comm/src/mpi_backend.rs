// crates/hf_comm/src/mpi_backend.rs

//! MPI 通信后端（rsmpi）
//!
//! 批量交换使用非阻塞发送：先在请求作用域内发起全部 `immediate_send`，
//! 再阻塞接收，最后等待全部发送请求完成，之后发送缓冲才可被复用。

use mpi::environment::Universe;
use mpi::topology::SimpleCommunicator;
use mpi::traits::{Communicator as MpiCommunicator, Destination, Source};

use hf_foundation::{HfError, HfResult};

use crate::communicator::{Communicator, RecvSpec, SendSpec};

/// MPI 通信上下文
pub struct MpiComm {
    // 字段按声明顺序析构：world 必须先于 universe 释放
    world: SimpleCommunicator,
    _universe: Universe,
}

impl MpiComm {
    /// 初始化 MPI 环境，每个进程只能调用一次
    pub fn initialize() -> HfResult<Self> {
        let universe = mpi::initialize()
            .ok_or_else(|| HfError::communication("MPI 初始化失败或已初始化"))?;
        let world = universe.world();
        log::info!("MPI 初始化: rank {}/{}", world.rank(), world.size());
        Ok(Self {
            world,
            _universe: universe,
        })
    }

    fn rank_of(peer: usize) -> HfResult<i32> {
        i32::try_from(peer)
            .map_err(|_| HfError::communication(format!("rank 编号超出 MPI 范围: {peer}")))
    }

    fn receive_checked(&self, source: usize, tag: i32, data: &mut [f64]) -> HfResult<()> {
        let process = self.world.process_at_rank(Self::rank_of(source)?);
        let (payload, _status) = process.receive_vec_with_tag::<f64>(tag);
        if payload.len() != data.len() {
            return Err(HfError::communication(format!(
                "rank {} 收到来自 rank {} 的消息长度 {} 与接收缓冲 {} 不一致 (tag={})",
                self.world.rank(),
                source,
                payload.len(),
                data.len(),
                tag
            )));
        }
        data.copy_from_slice(&payload);
        Ok(())
    }
}

impl Communicator for MpiComm {
    fn rank(&self) -> usize {
        self.world.rank() as usize
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }

    fn send(&self, dest: usize, tag: i32, data: &[f64]) -> HfResult<()> {
        self.world
            .process_at_rank(Self::rank_of(dest)?)
            .send_with_tag(data, tag);
        Ok(())
    }

    fn recv(&self, source: usize, tag: i32, data: &mut [f64]) -> HfResult<()> {
        self.receive_checked(source, tag, data)
    }

    fn exchange(&self, sends: &[SendSpec<'_>], recvs: &mut [RecvSpec<'_>]) -> HfResult<()> {
        let dests = sends
            .iter()
            .map(|s| Self::rank_of(s.dest))
            .collect::<HfResult<Vec<_>>>()?;

        mpi::request::scope(|scope| {
            let requests: Vec<_> = sends
                .iter()
                .zip(&dests)
                .map(|(s, &dest)| {
                    self.world
                        .process_at_rank(dest)
                        .immediate_send_with_tag(scope, s.data, s.tag)
                })
                .collect();

            // 接收出错时仍需等待全部发送完成，请求不能在作用域内悬空
            let received = recvs
                .iter_mut()
                .try_for_each(|r| self.receive_checked(r.source, r.tag, r.data));

            for request in requests {
                request.wait();
            }
            received
        })
    }

    fn name(&self) -> &'static str {
        "mpi"
    }
}

// crates/hf_solver/src/engine/ghost_exchange.rs

//! 分区间 ghost 交换
//!
//! 对任意按单元存放、步长为 `vars` 的数组，按网格的通信描述符
//! 打包发送单元、与相邻分区交换、解包写入晕单元。
//!
//! 暂存缓冲在构建时按描述符分配一次，之后每次交换复用。

use hf_comm::{Communicator, RecvSpec, SendSpec};
use hf_foundation::{HfError, HfResult};
use hf_mesh::{CommDescriptor, MeshPartition};

/// ghost 交换器
#[derive(Debug, Clone)]
pub struct GhostExchange {
    vars: usize,
    n_cells: usize,
    channels: Vec<CommDescriptor>,
    send_bufs: Vec<Vec<f64>>,
    recv_bufs: Vec<Vec<f64>>,
}

impl GhostExchange {
    /// 按网格的通信描述符创建
    pub fn new(mesh: &MeshPartition, vars: usize) -> Self {
        let channels = mesh.comms.clone();
        let send_bufs = channels
            .iter()
            .map(|c| vec![0.0; c.send_indices.len() * vars])
            .collect();
        let recv_bufs = channels
            .iter()
            .map(|c| vec![0.0; c.recv_indices.len() * vars])
            .collect();

        Self {
            vars,
            n_cells: mesh.n_cells,
            channels,
            send_bufs,
            recv_bufs,
        }
    }

    /// 相邻分区数
    pub fn n_neighbors(&self) -> usize {
        self.channels.len()
    }

    /// 检查描述符中的对端与通信域一致
    pub fn check_peers<C: Communicator + ?Sized>(&self, comm: &C) -> HfResult<()> {
        for ch in &self.channels {
            if ch.peer >= comm.size() || ch.peer == comm.rank() {
                return Err(HfError::configuration(format!(
                    "rank {} 的通信描述符指向非法对端 {} (size={})",
                    comm.rank(),
                    ch.peer,
                    comm.size()
                )));
            }
        }
        Ok(())
    }

    /// 交换一个数组
    ///
    /// 先打包并发起全部发送，再阻塞接收，最后等待发送完成后解包。
    pub fn exchange<C: Communicator + ?Sized>(&mut self, comm: &C, field: &mut [f64]) -> HfResult<()> {
        if self.channels.is_empty() {
            return Ok(());
        }
        HfError::check_size("ghost exchange field", self.vars * self.n_cells, field.len())?;
        let vars = self.vars;

        for (ch, buf) in self.channels.iter().zip(self.send_bufs.iter_mut()) {
            for (slot, &cell) in buf.chunks_exact_mut(vars).zip(&ch.send_indices) {
                slot.copy_from_slice(&field[cell * vars..(cell + 1) * vars]);
            }
        }

        let sends: Vec<SendSpec<'_>> = self
            .channels
            .iter()
            .zip(&self.send_bufs)
            .map(|(ch, buf)| SendSpec {
                dest: ch.peer,
                tag: ch.tag,
                data: buf,
            })
            .collect();
        let mut recvs: Vec<RecvSpec<'_>> = self
            .channels
            .iter()
            .zip(self.recv_bufs.iter_mut())
            .map(|(ch, buf)| RecvSpec {
                source: ch.peer,
                tag: ch.tag,
                data: buf,
            })
            .collect();

        comm.exchange(&sends, &mut recvs)?;
        drop(recvs);

        for (ch, buf) in self.channels.iter().zip(&self.recv_bufs) {
            for (slot, &cell) in buf.chunks_exact(vars).zip(&ch.recv_indices) {
                field[cell * vars..(cell + 1) * vars].copy_from_slice(slot);
            }
        }

        log::trace!("rank {} 完成 ghost 交换: {} 个相邻分区", comm.rank(), self.channels.len());
        Ok(())
    }
}

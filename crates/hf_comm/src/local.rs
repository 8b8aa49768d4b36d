// crates/hf_comm/src/local.rs

//! 进程内多 rank 通信
//!
//! 每个 rank 运行在独立线程上，拥有一个入站通道。发送为缓冲发送（立即返回），
//! 接收按 `(source, tag)` 以 FIFO 顺序匹配，先到达但不匹配的消息暂存。
//!
//! 任一 rank 退出时会释放其发送端；当某 rank 的全部对端都已退出，
//! 阻塞接收返回通信错误而不是永久挂起。测试中可额外设置接收超时。
//!
//! # 示例
//!
//! ```
//! use hf_comm::{run_local, star_all_reduce, Communicator, ReduceOp};
//!
//! let sums = run_local(3, |comm| {
//!     let mut v = [comm.rank() as f64 + 1.0];
//!     star_all_reduce(&comm, &mut v, ReduceOp::Sum).map(|_| v[0])
//! })
//! .unwrap();
//! assert!(sums.iter().all(|s| *s.as_ref().unwrap() == 6.0));
//! ```

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use parking_lot::Mutex;

use hf_foundation::{HfError, HfResult};

use crate::communicator::Communicator;

/// 消息信封
#[derive(Debug)]
struct Envelope {
    source: usize,
    tag: i32,
    payload: Vec<f64>,
}

/// 进程内 rank 端点
#[derive(Debug)]
pub struct LocalComm {
    rank: usize,
    size: usize,
    /// 指向各 rank 入站通道的发送端，自身位置为 `None`
    outboxes: Vec<Option<Sender<Envelope>>>,
    inbox: Receiver<Envelope>,
    /// 已到达但尚未匹配的消息
    pending: Mutex<VecDeque<Envelope>>,
    timeout: Option<Duration>,
}

/// 进程内通信域工厂
#[derive(Debug, Clone, Copy)]
pub struct LocalUniverse;

impl LocalUniverse {
    /// 创建 `size` 个互联的 rank 端点
    pub fn create(size: usize) -> HfResult<Vec<LocalComm>> {
        if size == 0 {
            return Err(HfError::configuration("进程内通信域至少需要 1 个 rank"));
        }

        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..size).map(|_| mpsc::channel::<Envelope>()).unzip();

        let comms = receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| {
                let outboxes = senders
                    .iter()
                    .enumerate()
                    .map(|(dest, tx)| (dest != rank).then(|| tx.clone()))
                    .collect();
                LocalComm {
                    rank,
                    size,
                    outboxes,
                    inbox,
                    pending: Mutex::new(VecDeque::new()),
                    timeout: None,
                }
            })
            .collect();

        log::debug!("创建进程内通信域: {} 个 rank", size);
        Ok(comms)
    }
}

impl LocalComm {
    /// 设置接收超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn check_peer(&self, peer: usize) -> HfResult<()> {
        if peer >= self.size {
            return Err(HfError::communication(format!(
                "rank {} 不存在 (size={})",
                peer, self.size
            )));
        }
        Ok(())
    }

    fn take_pending(&self, source: usize, tag: i32) -> Option<Envelope> {
        let mut pending = self.pending.lock();
        let pos = pending
            .iter()
            .position(|e| e.source == source && e.tag == tag)?;
        pending.remove(pos)
    }

    fn wait_for(&self, source: usize, tag: i32) -> HfResult<Envelope> {
        if let Some(env) = self.take_pending(source, tag) {
            return Ok(env);
        }

        loop {
            let env = match self.timeout {
                Some(timeout) => self.inbox.recv_timeout(timeout).map_err(|e| match e {
                    RecvTimeoutError::Timeout => HfError::communication(format!(
                        "rank {} 等待来自 rank {} 的消息超时 (tag={})",
                        self.rank, source, tag
                    )),
                    RecvTimeoutError::Disconnected => self.disconnected(source, tag),
                })?,
                None => self.inbox.recv().map_err(|_| self.disconnected(source, tag))?,
            };

            if env.source == source && env.tag == tag {
                return Ok(env);
            }
            log::trace!(
                "rank {} 暂存消息: source={} tag={}",
                self.rank,
                env.source,
                env.tag
            );
            self.pending.lock().push_back(env);
        }
    }

    fn disconnected(&self, source: usize, tag: i32) -> HfError {
        HfError::communication(format!(
            "rank {} 等待来自 rank {} 的消息 (tag={}) 时对端已全部断开",
            self.rank, source, tag
        ))
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&self, dest: usize, tag: i32, data: &[f64]) -> HfResult<()> {
        self.check_peer(dest)?;
        let env = Envelope {
            source: self.rank,
            tag,
            payload: data.to_vec(),
        };

        match &self.outboxes[dest] {
            Some(tx) => tx.send(env).map_err(|_| {
                HfError::communication(format!(
                    "rank {} 向 rank {} 发送失败: 对端已退出 (tag={})",
                    self.rank, dest, tag
                ))
            }),
            None => {
                self.pending.lock().push_back(env);
                Ok(())
            }
        }
    }

    fn recv(&self, source: usize, tag: i32, data: &mut [f64]) -> HfResult<()> {
        self.check_peer(source)?;
        let env = self.wait_for(source, tag)?;

        if env.payload.len() != data.len() {
            return Err(HfError::communication(format!(
                "rank {} 收到来自 rank {} 的消息长度 {} 与接收缓冲 {} 不一致 (tag={})",
                self.rank,
                source,
                env.payload.len(),
                data.len(),
                tag
            )));
        }

        data.copy_from_slice(&env.payload);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// 在 `size` 个线程上运行 SPMD 闭包，按 rank 顺序返回各线程结果
///
/// 任一线程 panic 时返回通信错误。
pub fn run_local<T, F>(size: usize, f: F) -> HfResult<Vec<T>>
where
    T: Send,
    F: Fn(LocalComm) -> T + Sync,
{
    let comms = LocalUniverse::create(size)?;
    let f = &f;

    std::thread::scope(|scope| {
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| {
                let rank = comm.rank();
                let handle = std::thread::Builder::new()
                    .name(format!("hf-rank-{rank}"))
                    .spawn_scoped(scope, move || f(comm))
                    .map_err(|e| HfError::io_with_source(format!("无法启动 rank {rank} 线程"), e));
                (rank, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(rank, handle)| {
                handle?
                    .join()
                    .map_err(|_| HfError::communication(format!("rank {rank} 线程异常退出")))
            })
            .collect()
    })
}

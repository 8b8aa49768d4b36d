// crates/hf_comm/src/communicator.rs

//! 通信上下文 trait
//!
//! 点对点消息以 `(对端 rank, tag)` 寻址，载荷为 `f64` 切片。接收方提供
//! 固定长度缓冲区，到达消息长度与之不符时返回通信错误，保留消息帧语义。

use hf_foundation::HfResult;

/// 根进程编号
pub const ROOT_RANK: usize = 0;

/// 一次交换中的发送项
#[derive(Debug, Clone, Copy)]
pub struct SendSpec<'a> {
    /// 目标 rank
    pub dest: usize,
    /// 消息标签
    pub tag: i32,
    /// 待发送数据（发送完成前不得修改）
    pub data: &'a [f64],
}

/// 一次交换中的接收项
#[derive(Debug)]
pub struct RecvSpec<'a> {
    /// 来源 rank
    pub source: usize,
    /// 消息标签
    pub tag: i32,
    /// 接收缓冲区，长度即期望消息长度
    pub data: &'a mut [f64],
}

/// 显式通信上下文
pub trait Communicator {
    /// 本进程编号
    fn rank(&self) -> usize;

    /// 进程总数
    fn size(&self) -> usize;

    /// 阻塞发送
    fn send(&self, dest: usize, tag: i32, data: &[f64]) -> HfResult<()>;

    /// 阻塞接收，`data.len()` 必须与到达消息长度一致
    fn recv(&self, source: usize, tag: i32, data: &mut [f64]) -> HfResult<()>;

    /// 先发后收的批量交换
    ///
    /// 先发起全部发送，再依次阻塞接收，最后等待全部发送完成。
    /// 默认实现要求 `send` 不依赖对端配对即可返回（缓冲发送）；
    /// 发送可能阻塞的后端必须重写本方法使用非阻塞发送。
    fn exchange(&self, sends: &[SendSpec<'_>], recvs: &mut [RecvSpec<'_>]) -> HfResult<()> {
        for s in sends {
            self.send(s.dest, s.tag, s.data)?;
        }
        for r in recvs.iter_mut() {
            self.recv(r.source, r.tag, r.data)?;
        }
        Ok(())
    }

    /// 后端名称
    fn name(&self) -> &'static str;

    /// 是否为根进程
    #[inline]
    fn is_root(&self) -> bool {
        self.rank() == ROOT_RANK
    }

    /// 是否为多进程运行
    #[inline]
    fn is_distributed(&self) -> bool {
        self.size() > 1
    }
}

impl<C: Communicator + ?Sized> Communicator for &C {
    fn rank(&self) -> usize {
        (**self).rank()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn send(&self, dest: usize, tag: i32, data: &[f64]) -> HfResult<()> {
        (**self).send(dest, tag, data)
    }

    fn recv(&self, source: usize, tag: i32, data: &mut [f64]) -> HfResult<()> {
        (**self).recv(source, tag, data)
    }

    fn exchange(&self, sends: &[SendSpec<'_>], recvs: &mut [RecvSpec<'_>]) -> HfResult<()> {
        (**self).exchange(sends, recvs)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

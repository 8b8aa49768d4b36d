// crates/hf_mesh/src/generation.rs

//! 结构化矩形网格生成
//!
//! 生成矩形域上的四边形单元网格，并按 x 方向列条带切分为多个分区。
//! 每个分区包含本分区拥有的列、左右相邻列的晕单元、全局边界上的
//! 边界 ghost 单元，以及与左右相邻分区的通信描述符。
//!
//! # 使用示例
//!
//! ```rust
//! use hf_mesh::generation::RectMeshGenerator;
//!
//! let generator = RectMeshGenerator::new(8, 2, 1.0, 0.25);
//! let mesh = generator.build().unwrap();
//! assert_eq!(mesh.n_real_cells, 16);
//!
//! let parts = generator.partition_columns(2).unwrap();
//! assert_eq!(parts.len(), 2);
//! assert_eq!(parts[0].comms[0].peer, 1);
//! ```

use glam::DVec2;

use hf_foundation::{HfError, HfResult};

use crate::builder::PartitionBuilder;
use crate::descriptor::CommDescriptor;
use crate::partition::MeshPartition;

/// 分区间 ghost 交换的消息标签
pub const HALO_TAG: i32 = 0;

/// 四条边界的标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryTags {
    /// x = x0
    pub left: String,
    /// x = x0 + lx
    pub right: String,
    /// y = y0
    pub bottom: String,
    /// y = y0 + ly
    pub top: String,
}

impl Default for BoundaryTags {
    fn default() -> Self {
        Self::uniform("wall")
    }
}

impl BoundaryTags {
    /// 四条边界使用同一标签
    pub fn uniform(tag: &str) -> Self {
        Self {
            left: tag.to_string(),
            right: tag.to_string(),
            bottom: tag.to_string(),
            top: tag.to_string(),
        }
    }
}

/// 矩形结构化网格生成器
///
/// 全局单元编号按行主序：`global = j * nx + i`
#[derive(Debug, Clone)]
pub struct RectMeshGenerator {
    /// x 方向单元数
    nx: usize,
    /// y 方向单元数
    ny: usize,
    /// x 方向域长度
    lx: f64,
    /// y 方向域长度
    ly: f64,
    /// 原点
    origin: DVec2,
    /// 边界标签
    tags: BoundaryTags,
}

impl RectMeshGenerator {
    /// 创建矩形网格生成器
    ///
    /// # 参数
    ///
    /// - `nx`: x 方向单元数
    /// - `ny`: y 方向单元数
    /// - `lx`: x 方向域长度
    /// - `ly`: y 方向域长度
    pub fn new(nx: usize, ny: usize, lx: f64, ly: f64) -> Self {
        Self {
            nx,
            ny,
            lx,
            ly,
            origin: DVec2::ZERO,
            tags: BoundaryTags::default(),
        }
    }

    /// 设置原点偏移
    pub fn with_origin(mut self, x0: f64, y0: f64) -> Self {
        self.origin = DVec2::new(x0, y0);
        self
    }

    /// 设置边界标签
    pub fn with_tags(mut self, tags: BoundaryTags) -> Self {
        self.tags = tags;
        self
    }

    /// x 方向网格间距
    pub fn dx(&self) -> f64 {
        self.lx / self.nx as f64
    }

    /// y 方向网格间距
    pub fn dy(&self) -> f64 {
        self.ly / self.ny as f64
    }

    /// 全局单元数
    pub fn n_cells(&self) -> usize {
        self.nx * self.ny
    }

    fn check(&self) -> HfResult<()> {
        if self.nx == 0 || self.ny == 0 {
            return Err(HfError::configuration(format!(
                "网格尺寸必须为正: nx={}, ny={}",
                self.nx, self.ny
            )));
        }
        if !(self.lx > 0.0) || !(self.ly > 0.0) {
            return Err(HfError::configuration(format!(
                "域长度必须为正: lx={}, ly={}",
                self.lx, self.ly
            )));
        }
        Ok(())
    }

    fn cell_center(&self, i: usize, j: usize) -> DVec2 {
        self.origin + DVec2::new((i as f64 + 0.5) * self.dx(), (j as f64 + 0.5) * self.dy())
    }

    /// 生成单分区网格
    pub fn build(&self) -> HfResult<MeshPartition> {
        self.check()?;
        self.build_columns(0, self.nx, None, None)
    }

    /// 按列条带切分为 `n_parts` 个分区，分区 r 由 rank r 持有
    pub fn partition_columns(&self, n_parts: usize) -> HfResult<Vec<MeshPartition>> {
        self.check()?;
        if n_parts == 0 || n_parts > self.nx {
            return Err(HfError::configuration(format!(
                "分区数 {} 必须在 1..={} 之间",
                n_parts, self.nx
            )));
        }

        let base = self.nx / n_parts;
        let rem = self.nx % n_parts;
        let mut start = 0;
        let mut parts = Vec::with_capacity(n_parts);
        for rank in 0..n_parts {
            let width = base + usize::from(rank < rem);
            let end = start + width;
            let left = (rank > 0).then(|| rank - 1);
            let right = (rank + 1 < n_parts).then(|| rank + 1);
            parts.push(self.build_columns(start, end, left, right)?);
            start = end;
        }

        log::debug!(
            "矩形网格 {}x{} 切分为 {} 个列条带分区",
            self.nx,
            self.ny,
            n_parts
        );
        Ok(parts)
    }

    /// 生成拥有列 `[c0, c1)` 的分区
    fn build_columns(
        &self,
        c0: usize,
        c1: usize,
        left_peer: Option<usize>,
        right_peer: Option<usize>,
    ) -> HfResult<MeshPartition> {
        let (nx, ny) = (self.nx, self.ny);
        let (dx, dy) = (self.dx(), self.dy());
        let area = dx * dy;
        let mut b = PartitionBuilder::new();

        // 本地索引表: local[(i - lo) * ny + j]
        let lo = if left_peer.is_some() { c0 - 1 } else { c0 };
        let hi = if right_peer.is_some() { c1 + 1 } else { c1 };
        let mut local = vec![usize::MAX; (hi - lo) * ny];
        let slot = |i: usize, j: usize| (i - lo) * ny + j;

        // 拥有单元
        for i in c0..c1 {
            for j in 0..ny {
                let id = b.add_cell(area, self.cell_center(i, j));
                b.set_global_id(id, j * nx + i);
                local[slot(i, j)] = id;
            }
        }

        // 晕单元
        let halo_columns = [left_peer.map(|_| c0 - 1), right_peer.map(|_| c1)];
        for i in halo_columns.into_iter().flatten() {
            for j in 0..ny {
                let id = b.add_halo_cell(area, self.cell_center(i, j));
                b.set_global_id(id, j * nx + i);
                local[slot(i, j)] = id;
            }
        }

        // 竖直内部边: 列 a 与 a+1 之间，至少一侧为拥有列
        for a in lo..hi.saturating_sub(1) {
            if a + 1 < c0 || a >= c1 {
                continue;
            }
            for j in 0..ny {
                let center = self.origin + DVec2::new((a + 1) as f64 * dx, (j as f64 + 0.5) * dy);
                b.add_edge(local[slot(a, j)], local[slot(a + 1, j)], DVec2::X, dy, center);
            }
        }

        // 水平内部边
        for i in c0..c1 {
            for j in 0..ny.saturating_sub(1) {
                let center = self.origin + DVec2::new((i as f64 + 0.5) * dx, (j + 1) as f64 * dy);
                b.add_edge(local[slot(i, j)], local[slot(i, j + 1)], DVec2::Y, dx, center);
            }
        }

        // 全局边界边
        let x0 = self.origin.x;
        let y0 = self.origin.y;
        for i in c0..c1 {
            for j in 0..ny {
                let cell = local[slot(i, j)];
                let yc = y0 + (j as f64 + 0.5) * dy;
                let xc = x0 + (i as f64 + 0.5) * dx;
                if i == 0 {
                    b.add_boundary_edge(cell, -DVec2::X, dy, DVec2::new(x0, yc), self.tags.left.as_str());
                }
                if i == nx - 1 {
                    b.add_boundary_edge(cell, DVec2::X, dy, DVec2::new(x0 + self.lx, yc), self.tags.right.as_str());
                }
                if j == 0 {
                    b.add_boundary_edge(cell, -DVec2::Y, dx, DVec2::new(xc, y0), self.tags.bottom.as_str());
                }
                if j == ny - 1 {
                    b.add_boundary_edge(cell, DVec2::Y, dx, DVec2::new(xc, y0 + self.ly), self.tags.top.as_str());
                }
            }
        }

        // 通信描述符: 发送相邻的拥有列，接收对应晕列
        let column = |i: usize| (0..ny).map(|j| local[slot(i, j)]).collect::<Vec<_>>();
        if let Some(peer) = left_peer {
            b.add_comm(CommDescriptor::new(peer, HALO_TAG, column(c0), column(c0 - 1)));
        }
        if let Some(peer) = right_peer {
            b.add_comm(CommDescriptor::new(peer, HALO_TAG, column(c1 - 1), column(c1)));
        }

        b.build()
    }
}

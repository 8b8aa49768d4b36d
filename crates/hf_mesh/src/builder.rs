// crates/hf_mesh/src/builder.rs

//! 分区网格构建器
//!
//! 按顺序添加单元与边，最后一次性生成 [`MeshPartition`] 并校验。
//! 实单元（拥有单元与晕单元）必须先于边界 ghost 单元添加。
//!
//! # 示例
//!
//! ```
//! use glam::DVec2;
//! use hf_mesh::PartitionBuilder;
//!
//! let mut b = PartitionBuilder::new();
//! let left = b.add_cell(1.0, DVec2::new(0.5, 0.5));
//! let right = b.add_cell(1.0, DVec2::new(1.5, 0.5));
//! b.add_edge(left, right, DVec2::X, 1.0, DVec2::new(1.0, 0.5));
//! b.add_boundary_edge(left, -DVec2::X, 1.0, DVec2::new(0.0, 0.5), "wall");
//! let mesh = b.build().unwrap();
//!
//! assert_eq!(mesh.n_real_cells, 2);
//! assert_eq!(mesh.n_cells, 3);
//! ```

use glam::DVec2;

use hf_foundation::{HfError, HfResult};

use crate::descriptor::{BoundaryEdge, CommDescriptor};
use crate::partition::MeshPartition;

/// 分区网格构建器
#[derive(Debug, Default)]
pub struct PartitionBuilder {
    mesh: MeshPartition,
    /// 首个边界 ghost 之后又添加了实单元
    order_violation: Option<usize>,
}

impl PartitionBuilder {
    /// 创建空构建器
    pub fn new() -> Self {
        Self::default()
    }

    fn push_cell(&mut self, area: f64, center: DVec2, is_ghost: bool) -> usize {
        let m = &mut self.mesh;
        let id = m.n_cells;
        m.cell_area.push(area);
        m.cell_center.push(center);
        m.cell_is_ghost.push(is_ghost);
        m.cell_global_id.push(None);
        m.n_cells += 1;
        id
    }

    fn push_real(&mut self, area: f64, center: DVec2, is_halo: bool) -> usize {
        if self.mesh.n_real_cells != self.mesh.n_cells && self.order_violation.is_none() {
            self.order_violation = Some(self.mesh.n_cells);
        }
        let id = self.push_cell(area, center, is_halo);
        self.mesh.n_real_cells = self.mesh.n_cells;
        id
    }

    /// 添加本分区拥有的单元
    pub fn add_cell(&mut self, area: f64, center: DVec2) -> usize {
        self.push_real(area, center, false)
    }

    /// 添加晕单元（镜像相邻分区的拥有单元）
    pub fn add_halo_cell(&mut self, area: f64, center: DVec2) -> usize {
        self.push_real(area, center, true)
    }

    /// 添加边界 ghost 单元
    pub fn add_ghost_cell(&mut self, area: f64, center: DVec2) -> usize {
        self.push_cell(area, center, true)
    }

    /// 设置全局单元编号
    pub fn set_global_id(&mut self, cell: usize, global: usize) {
        if let Some(slot) = self.mesh.cell_global_id.get_mut(cell) {
            *slot = Some(global);
        }
    }

    /// 添加边，法向量由 i 指向 j
    pub fn add_edge(
        &mut self,
        i: usize,
        j: usize,
        normal: DVec2,
        length: f64,
        center: DVec2,
    ) -> usize {
        let m = &mut self.mesh;
        let id = m.edge_cells.len();
        m.edge_cells.push([i, j]);
        m.edge_normal.push(normal);
        m.edge_length.push(length);
        m.edge_center.push(center);
        id
    }

    /// 添加边界边并创建对应的边界 ghost 单元
    ///
    /// ghost 单元取内部单元关于边中心的镜像位置，面积与内部单元相同。
    /// 返回 `(边索引, ghost 单元索引)`。
    pub fn add_boundary_edge(
        &mut self,
        interior: usize,
        normal: DVec2,
        length: f64,
        center: DVec2,
        tag: impl Into<String>,
    ) -> (usize, usize) {
        let (area, inner) = match (
            self.mesh.cell_area.get(interior),
            self.mesh.cell_center.get(interior),
        ) {
            (Some(&a), Some(&c)) => (a, c),
            // 非法索引留给 build() 中的校验报告
            _ => (1.0, center),
        };
        let ghost = self.add_ghost_cell(area, 2.0 * center - inner);
        let edge = self.add_edge(interior, ghost, normal, length, center);
        self.mesh.boundary_edges.push(BoundaryEdge {
            edge,
            tag: tag.into(),
        });
        (edge, ghost)
    }

    /// 添加通信描述符
    pub fn add_comm(&mut self, descriptor: CommDescriptor) {
        self.mesh.comms.push(descriptor);
    }

    /// 生成分区网格并校验
    pub fn build(self) -> HfResult<MeshPartition> {
        if let Some(cell) = self.order_violation {
            return Err(HfError::invalid_mesh(format!(
                "实单元 {cell} 在边界 ghost 单元之后添加"
            )));
        }

        let mut mesh = self.mesh;
        let n = mesh.n_cells;
        let mut delta_i = Vec::with_capacity(mesh.edge_cells.len());
        let mut delta_j = Vec::with_capacity(mesh.edge_cells.len());
        for (e, &[i, j]) in mesh.edge_cells.iter().enumerate() {
            HfError::check_index("Cell", i, n)?;
            HfError::check_index("Cell", j, n)?;
            let c = mesh.edge_center[e];
            delta_i.push(c - mesh.cell_center[i]);
            delta_j.push(c - mesh.cell_center[j]);
        }
        mesh.edge_delta_i = delta_i;
        mesh.edge_delta_j = delta_j;

        mesh.validate()?;
        Ok(mesh)
    }
}

// crates/hf_mesh/src/partition.rs

//! 分区网格
//!
//! 单个进程的只读 SoA 网格。边方向（i → j）在构建时固定，
//! 求解器不会修改任何网格数据。
//!
//! # 设计要点
//!
//! 1. **SoA布局**: 单元与边的几何量各自连续存储
//! 2. **只读**: 构建并校验后仅以共享引用使用
//! 3. **预计算偏移**: 边中心相对两侧单元中心的向量在构建时算好

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use hf_foundation::{HfError, HfResult};

use crate::descriptor::{BoundaryEdge, CommDescriptor};
use crate::NORMAL_TOLERANCE;

/// 分区网格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshPartition {
    // ===== 单元数据 =====
    /// 单元总数（含边界 ghost）
    pub n_cells: usize,
    /// 实单元数量，索引 >= 该值的单元为边界 ghost
    pub n_real_cells: usize,
    /// 单元面积
    pub cell_area: Vec<f64>,
    /// 单元中心
    pub cell_center: Vec<DVec2>,
    /// ghost 标记（晕单元与边界 ghost 均为 true）
    pub cell_is_ghost: Vec<bool>,
    /// 全局单元编号，边界 ghost 为 `None`
    pub cell_global_id: Vec<Option<usize>>,

    // ===== 边数据 =====
    /// 边两侧单元 `[i, j]`
    pub edge_cells: Vec<[usize; 2]>,
    /// 单位法向量，由 i 指向 j
    pub edge_normal: Vec<DVec2>,
    /// 边长度
    pub edge_length: Vec<f64>,
    /// 边中心
    pub edge_center: Vec<DVec2>,
    /// 边中心减去 i 单元中心
    pub edge_delta_i: Vec<DVec2>,
    /// 边中心减去 j 单元中心
    pub edge_delta_j: Vec<DVec2>,

    // ===== 边界与通信 =====
    /// 边界边列表
    pub boundary_edges: Vec<BoundaryEdge>,
    /// 与相邻分区的通信描述符
    pub comms: Vec<CommDescriptor>,
}

impl Default for MeshPartition {
    fn default() -> Self {
        Self::empty()
    }
}

impl MeshPartition {
    /// 创建空分区
    pub fn empty() -> Self {
        Self {
            n_cells: 0,
            n_real_cells: 0,
            cell_area: Vec::new(),
            cell_center: Vec::new(),
            cell_is_ghost: Vec::new(),
            cell_global_id: Vec::new(),
            edge_cells: Vec::new(),
            edge_normal: Vec::new(),
            edge_length: Vec::new(),
            edge_center: Vec::new(),
            edge_delta_i: Vec::new(),
            edge_delta_j: Vec::new(),
            boundary_edges: Vec::new(),
            comms: Vec::new(),
        }
    }

    // =========================================================================
    // 基本访问
    // =========================================================================

    /// 单元总数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// 实单元数量
    #[inline]
    pub fn n_real_cells(&self) -> usize {
        self.n_real_cells
    }

    /// 边数量
    #[inline]
    pub fn n_edges(&self) -> usize {
        self.edge_cells.len()
    }

    /// 单元面积
    #[inline]
    pub fn cell_area(&self, cell: usize) -> f64 {
        self.cell_area[cell]
    }

    /// 单元中心
    #[inline]
    pub fn cell_center(&self, cell: usize) -> DVec2 {
        self.cell_center[cell]
    }

    /// 是否为本分区拥有并参与更新的单元（实单元且非 ghost）
    #[inline]
    pub fn is_owned(&self, cell: usize) -> bool {
        cell < self.n_real_cells && !self.cell_is_ghost[cell]
    }

    /// 本分区拥有的单元索引
    pub fn owned_cells(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_real_cells).filter(move |&c| !self.cell_is_ghost[c])
    }

    /// 边两侧单元
    #[inline]
    pub fn edge_cells(&self, edge: usize) -> (usize, usize) {
        let [i, j] = self.edge_cells[edge];
        (i, j)
    }

    /// 是否有跨分区通信
    #[inline]
    pub fn has_comms(&self) -> bool {
        !self.comms.is_empty()
    }

    // =========================================================================
    // 序列化
    // =========================================================================

    /// 从 JSON 解析并校验
    pub fn from_json(content: &str) -> HfResult<Self> {
        let mesh: MeshPartition = serde_json::from_str(content)?;
        mesh.validate()?;
        Ok(mesh)
    }

    /// 序列化为 JSON
    pub fn to_json(&self) -> HfResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    // =========================================================================
    // 统计与校验
    // =========================================================================

    /// 统计信息
    pub fn statistics(&self) -> PartitionStatistics {
        let n_owned = self.owned_cells().count();
        let total_area = self.owned_cells().map(|c| self.cell_area[c]).sum();
        let (min_len, max_len) = self
            .edge_length
            .iter()
            .fold((f64::MAX, 0.0_f64), |(lo, hi), &l| (lo.min(l), hi.max(l)));

        PartitionStatistics {
            n_cells: self.n_cells,
            n_owned,
            n_halo: self.n_real_cells - n_owned,
            n_boundary_ghost: self.n_cells - self.n_real_cells,
            n_edges: self.n_edges(),
            n_boundary_edges: self.boundary_edges.len(),
            n_neighbors: self.comms.len(),
            total_area,
            min_edge_length: if self.n_edges() > 0 { min_len } else { 0.0 },
            max_edge_length: max_len,
        }
    }

    /// 验证网格完整性
    ///
    /// 所有不一致都作为配置错误在运行前报告。
    pub fn validate(&self) -> HfResult<()> {
        let n = self.n_cells;

        // 数组长度
        HfError::check_size("cell_area", n, self.cell_area.len())?;
        HfError::check_size("cell_center", n, self.cell_center.len())?;
        HfError::check_size("cell_is_ghost", n, self.cell_is_ghost.len())?;
        HfError::check_size("cell_global_id", n, self.cell_global_id.len())?;

        let ne = self.edge_cells.len();
        HfError::check_size("edge_normal", ne, self.edge_normal.len())?;
        HfError::check_size("edge_length", ne, self.edge_length.len())?;
        HfError::check_size("edge_center", ne, self.edge_center.len())?;
        HfError::check_size("edge_delta_i", ne, self.edge_delta_i.len())?;
        HfError::check_size("edge_delta_j", ne, self.edge_delta_j.len())?;

        if self.n_real_cells > n {
            return Err(HfError::invalid_mesh(format!(
                "实单元数 {} 超过单元总数 {}",
                self.n_real_cells, n
            )));
        }

        // 单元几何
        for c in self.owned_cells() {
            let area = self.cell_area[c];
            if !(area > 0.0) || !area.is_finite() {
                return Err(HfError::invalid_mesh(format!("单元 {c} 面积非法: {area}")));
            }
        }
        for c in self.n_real_cells..n {
            if !self.cell_is_ghost[c] {
                return Err(HfError::invalid_mesh(format!(
                    "边界 ghost 单元 {c} 未标记为 ghost"
                )));
            }
        }

        // 边拓扑与几何
        for (e, &[i, j]) in self.edge_cells.iter().enumerate() {
            HfError::check_index("Cell", i, n)?;
            HfError::check_index("Cell", j, n)?;
            if i == j {
                return Err(HfError::invalid_mesh(format!("边 {e} 两侧为同一单元 {i}")));
            }

            let len = self.edge_length[e];
            if !(len > 0.0) || !len.is_finite() {
                return Err(HfError::invalid_mesh(format!("边 {e} 长度非法: {len}")));
            }

            let norm = self.edge_normal[e].length();
            if (norm - 1.0).abs() > NORMAL_TOLERANCE {
                return Err(HfError::invalid_mesh(format!(
                    "边 {e} 法向量不是单位向量: |n| = {norm}"
                )));
            }
        }

        // 边界边
        let mut seen = HashSet::new();
        for b in &self.boundary_edges {
            HfError::check_index("Edge", b.edge, ne)?;
            if b.tag.is_empty() {
                return Err(HfError::invalid_mesh(format!("边界边 {} 缺少标签", b.edge)));
            }
            if !seen.insert(b.edge) {
                return Err(HfError::invalid_mesh(format!("边界边 {} 重复出现", b.edge)));
            }
            let [i, j] = self.edge_cells[b.edge];
            if i >= self.n_real_cells || j < self.n_real_cells {
                return Err(HfError::invalid_mesh(format!(
                    "边界边 {} 必须由实单元指向边界 ghost 单元: ({i}, {j})",
                    b.edge
                )));
            }
        }

        let unbound = self
            .edge_cells
            .iter()
            .enumerate()
            .filter(|(e, cells)| cells[1] >= self.n_real_cells && !seen.contains(e))
            .count();
        if unbound > 0 {
            log::warn!("{} 条边连接边界 ghost 单元但不在边界边列表中", unbound);
        }

        // 通信描述符
        let mut peers = HashSet::new();
        for d in &self.comms {
            if !peers.insert((d.peer, d.tag)) {
                return Err(HfError::invalid_mesh(format!(
                    "重复的通信描述符: peer={} tag={}",
                    d.peer, d.tag
                )));
            }
            for &c in &d.send_indices {
                HfError::check_index("Cell", c, self.n_real_cells)?;
                if self.cell_is_ghost[c] {
                    return Err(HfError::invalid_mesh(format!(
                        "发送给 rank {} 的单元 {c} 是 ghost 单元",
                        d.peer
                    )));
                }
            }
            for &c in &d.recv_indices {
                HfError::check_index("Cell", c, self.n_real_cells)?;
                if !self.cell_is_ghost[c] {
                    return Err(HfError::invalid_mesh(format!(
                        "从 rank {} 接收的单元 {c} 不是晕单元",
                        d.peer
                    )));
                }
            }
        }

        Ok(())
    }
}

/// 分区统计信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionStatistics {
    /// 单元总数
    pub n_cells: usize,
    /// 拥有的单元数
    pub n_owned: usize,
    /// 晕单元数
    pub n_halo: usize,
    /// 边界 ghost 单元数
    pub n_boundary_ghost: usize,
    /// 边数
    pub n_edges: usize,
    /// 边界边数
    pub n_boundary_edges: usize,
    /// 相邻分区数
    pub n_neighbors: usize,
    /// 拥有单元总面积
    pub total_area: f64,
    /// 最短边
    pub min_edge_length: f64,
    /// 最长边
    pub max_edge_length: f64,
}

impl fmt::Display for PartitionStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== 分区统计 ===")?;
        writeln!(
            f,
            "单元数: {} (拥有: {}, 晕: {}, 边界 ghost: {})",
            self.n_cells, self.n_owned, self.n_halo, self.n_boundary_ghost
        )?;
        writeln!(f, "边数: {} (边界: {})", self.n_edges, self.n_boundary_edges)?;
        writeln!(f, "相邻分区: {}", self.n_neighbors)?;
        writeln!(f, "总面积: {:.6}", self.total_area)?;
        write!(
            f,
            "边长范围: [{:.6}, {:.6}]",
            self.min_edge_length, self.max_edge_length
        )
    }
}

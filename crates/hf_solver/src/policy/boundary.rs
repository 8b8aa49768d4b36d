// crates/hf_solver/src/policy/boundary.rs

//! 边界条件策略与注册表
//!
//! 注册表按标签保存边界条件对象。积分器构建时调用
//! [`BoundaryRegistry::resolve`] 把网格中每条边界边绑定到对应策略，
//! 未注册的标签在此时作为配置错误报告。

use glam::DVec2;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use hf_foundation::{HfError, HfResult};
use hf_mesh::MeshPartition;

/// 边界条件
///
/// 由内部单元状态和边的外法向计算 ghost 单元状态。
pub trait BoundaryCondition: Debug + Send + Sync {
    /// 写入 ghost 状态，三个切片长度均为 `vars`
    fn ghost_state(&self, interior: &[f64], normal: DVec2, ghost: &mut [f64]);

    /// 名称
    fn name(&self) -> &'static str;

    /// 要求的变量数，`None` 表示适用于任意变量数
    fn vars(&self) -> Option<usize> {
        None
    }
}

/// 边界条件注册表
#[derive(Debug, Clone, Default)]
pub struct BoundaryRegistry {
    conditions: HashMap<String, Arc<dyn BoundaryCondition>>,
}

/// 已解析的边界边绑定
#[derive(Debug, Clone)]
pub struct BoundaryBinding {
    /// 边索引
    pub edge: usize,
    /// 内部单元
    pub interior: usize,
    /// ghost 单元
    pub ghost: usize,
    /// 外法向
    pub normal: DVec2,
    /// 边界条件
    pub condition: Arc<dyn BoundaryCondition>,
}

impl BoundaryRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册边界条件，同名标签会被替换
    pub fn register(&mut self, tag: impl Into<String>, condition: Arc<dyn BoundaryCondition>) {
        let tag = tag.into();
        if self.conditions.insert(tag.clone(), condition).is_some() {
            log::warn!("边界标签 '{}' 被重复注册，使用最后一次注册的条件", tag);
        }
    }

    /// 查找边界条件
    pub fn get(&self, tag: &str) -> Option<&Arc<dyn BoundaryCondition>> {
        self.conditions.get(tag)
    }

    /// 已注册的标签
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }

    /// 已注册的 (标签, 条件)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn BoundaryCondition>)> {
        self.conditions.iter().map(|(tag, bc)| (tag.as_str(), bc))
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// 把网格中的边界边解析为绑定列表
    pub fn resolve(&self, mesh: &MeshPartition) -> HfResult<Vec<BoundaryBinding>> {
        mesh.boundary_edges
            .iter()
            .map(|b| {
                let condition = self.get(&b.tag).ok_or_else(|| {
                    HfError::configuration(format!(
                        "边界边 {} 的标签 '{}' 没有注册边界条件",
                        b.edge, b.tag
                    ))
                })?;
                HfError::check_index("Edge", b.edge, mesh.n_edges())?;
                let (interior, ghost) = mesh.edge_cells(b.edge);
                Ok(BoundaryBinding {
                    edge: b.edge,
                    interior,
                    ghost,
                    normal: mesh.edge_normal[b.edge],
                    condition: Arc::clone(condition),
                })
            })
            .collect()
    }
}

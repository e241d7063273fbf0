//! 链路权重
//!
//! 链路权重默认为其物理长度；任一端点被标记为 `OutRoute` 时视为无穷大。
//! `WeightOverlay` 在此之上叠加一次搜索私有的禁用节点与删除链路，
//! 不修改网络本身，因此可以在多个搜索任务间并发使用同一个 `&Network`。

use std::collections::HashSet;

use crate::net::{Link, LinkId, Network, NodeId, RouteRole};

/// 单次搜索私有的权重覆盖层
#[derive(Debug, Clone, Default)]
pub struct WeightOverlay {
    forbidden: HashSet<NodeId>,
    removed: HashSet<LinkId>,
}

impl WeightOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// 本次搜索中禁止经过该节点
    pub fn forbid_node(&mut self, node: NodeId) {
        self.forbidden.insert(node);
    }

    /// 本次搜索中视该链路为不存在
    pub fn remove_link(&mut self, link: LinkId) {
        self.removed.insert(link);
    }

    pub fn is_forbidden(&self, node: NodeId) -> bool {
        self.forbidden.contains(&node)
    }

    /// 链路权重；`None` 表示无穷大（不可用）
    pub fn weight(&self, net: &Network, link: &Link) -> Option<f64> {
        if self.removed.contains(&link.id) {
            return None;
        }
        for end in [link.from, link.to] {
            if self.is_forbidden(end) || net.route_role(end) == Some(RouteRole::OutRoute) {
                return None;
            }
        }
        Some(link.length)
    }
}

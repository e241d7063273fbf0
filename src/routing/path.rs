//! 路径类型

use serde::Serialize;

use crate::error::RoutingError;
use crate::net::{LinkId, Network, NodeId};

/// 从 `source` 到 `target` 的链路序列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    pub source: NodeId,
    pub target: NodeId,
    pub links: Vec<LinkId>,
    /// 链路物理长度之和
    pub cost: f64,
}

impl Path {
    /// 由链路序列构建路径，同时校验首尾相接
    pub fn from_links(net: &Network, source: NodeId, links: Vec<LinkId>) -> Result<Self, RoutingError> {
        let mut at = source;
        let mut cost = 0.0;
        for &id in &links {
            let link = net.link(id).ok_or(RoutingError::InconsistentPath(id))?;
            if link.from != at {
                return Err(RoutingError::InconsistentPath(id));
            }
            at = link.to;
            cost += link.length;
        }
        Ok(Self {
            source,
            target: at,
            links,
            cost,
        })
    }

    /// 路径经过的节点序列（含首尾）
    pub fn nodes(&self, net: &Network) -> Result<Vec<NodeId>, RoutingError> {
        let mut nodes = Vec::with_capacity(self.links.len() + 1);
        nodes.push(self.source);
        for &id in &self.links {
            let link = net.link(id).ok_or(RoutingError::InconsistentPath(id))?;
            if Some(&link.from) != nodes.last() {
                return Err(RoutingError::InconsistentPath(id));
            }
            nodes.push(link.to);
        }
        Ok(nodes)
    }

    /// 跳数
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

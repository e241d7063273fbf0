//! 链路类型
//!
//! 定义光纤链路。无向链路由一对互为反向的有向链路表示。

use serde::{Deserialize, Serialize};

use super::id::{LinkId, NodeId};

/// 添加链路时的方向性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Directed,
    /// 同时插入两个方向，且互相引用
    #[default]
    Undirected,
}

/// 有向光纤链路
#[derive(Debug, Clone)]
pub struct Link {
    pub id: LinkId,
    pub from: NodeId,
    pub to: NodeId,
    /// 物理长度/代价，恒为有限正数
    pub length: f64,
    /// 反向链路（非拥有引用）
    pub(crate) reverse: Option<LinkId>,
}

impl Link {
    /// 创建新链路
    pub fn new(id: LinkId, from: NodeId, to: NodeId, length: f64) -> Self {
        Self {
            id,
            from,
            to,
            length,
            reverse: None,
        }
    }

    pub fn reverse(&self) -> Option<LinkId> {
        self.reverse
    }
}

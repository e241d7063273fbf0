//! 节点类型
//!
//! 定义光层网络节点，包括其物理角色和路由角色。

use serde::{Deserialize, Serialize};

use super::id::NodeId;

/// 节点的物理角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetNodeKind {
    /// 终端（上下业务）
    #[default]
    Terminal,
    /// 光线路放大器
    LineAmplifier,
    /// 可重构光分插复用器
    Roadm,
}

/// 节点在路由计算中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRole {
    #[default]
    Undefined,
    /// 必经节点
    InRoute,
    /// 禁止经过的节点
    OutRoute,
}

/// 光层网络节点
#[derive(Debug, Clone)]
pub struct NetNode {
    id: NodeId,
    name: String,
    kind: NetNodeKind,
    pub(crate) role: RouteRole,
}

impl NetNode {
    /// 创建新节点
    pub fn new(id: NodeId, name: impl Into<String>, kind: NetNodeKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            role: RouteRole::Undefined,
        }
    }

    /// 获取节点标识符
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// 获取节点名称
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NetNodeKind {
        self.kind
    }

    pub fn role(&self) -> RouteRole {
        self.role
    }
}

//! 错误类型
//!
//! 拓扑、ODU 汇聚、路由与拓扑描述文件各自的错误枚举，以及 crate 级汇总错误。

use std::path::PathBuf;

use crate::net::{LinkId, NodeId, OtnNodeId, SignalId};
use crate::otn::OtnLevel;

/// 拓扑构建错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("unknown otn node {0:?}")]
    UnknownOtnNode(OtnNodeId),

    /// 同一方向上已存在链路
    #[error("link {from:?} -> {to:?} already exists as {existing:?}")]
    DuplicateLink {
        from: NodeId,
        to: NodeId,
        existing: LinkId,
    },

    #[error("node {0:?} already carries an otn node")]
    DuplicateOtnNode(NodeId),

    #[error("self loop on node {0:?}")]
    SelfLoop(NodeId),

    /// 链路长度必须为有限正数
    #[error("invalid link length {0}")]
    InvalidLength(f64),
}

/// ODU 汇聚错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OtnError {
    #[error("invalid rule set: {0}")]
    InvalidRuleSet(String),

    /// 规则要求 client < container
    #[error("invalid rule {client:?} -> {container:?}")]
    InvalidRule {
        client: OtnLevel,
        container: OtnLevel,
    },

    /// 带宽无法映射到任何 ODU 等级，或与等级标称带宽不符
    #[error("bandwidth {bandwidth_gbps} Gbps does not fit {level:?}")]
    LevelMismatch {
        bandwidth_gbps: f64,
        level: Option<OtnLevel>,
    },

    #[error("no aggregation path from {client:?} to apex {apex:?}")]
    NoAggregationPath { client: OtnLevel, apex: OtnLevel },

    #[error("capacity exceeded at {level:?} (capacity {capacity})")]
    CapacityExceeded { level: OtnLevel, capacity: usize },

    #[error("signal {0:?} not found")]
    SignalNotFound(SignalId),
}

/// 路由错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoutingError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("no path from {from:?} to {to:?}")]
    PathNotFound { from: NodeId, to: NodeId },

    /// 返回的链路序列首尾不相接（内部不变量被破坏）
    #[error("inconsistent path at link {0:?}")]
    InconsistentPath(LinkId),
}

/// 拓扑描述文件错误
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse network description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported schema_version {0}")]
    UnsupportedSchema(u32),

    #[error("unknown name {0:?}")]
    UnknownName(String),

    #[error("duplicate name {0:?}")]
    DuplicateName(String),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Otn(#[from] OtnError),

    #[error(transparent)]
    Routing(#[from] RoutingError),
}

/// crate 级错误
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Otn(#[from] OtnError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Spec(#[from] SpecError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for SpecError {
    fn from(e: Error) -> Self {
        match e {
            Error::Topology(e) => SpecError::Topology(e),
            Error::Otn(e) => SpecError::Otn(e),
            Error::Routing(e) => SpecError::Routing(e),
            Error::Spec(e) => e,
        }
    }
}

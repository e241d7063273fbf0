//! 网络拓扑模块
//!
//! 此模块包含光层拓扑的核心组件：节点、链路，以及同时承载光层与电层的网络对象。

// 子模块声明
mod id;
mod link;
mod network;
mod node;

// 重新导出公共接口
pub use id::{LinkId, NodeId, OtnNodeId, SignalId};
pub use link::{Link, LinkKind};
pub use network::{Network, SignalRecord};
pub use node::{NetNode, NetNodeKind, RouteRole};

//! 拓扑描述文件
//!
//! JSON 格式的网络描述：命名节点、链路、汇聚节点及初始客户信号。

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SpecError;
use crate::net::{LinkKind, NetNodeKind, Network, NodeId, OtnNodeId, RouteRole, SignalId};
use crate::otn::{AggregationRule, AggregationStrategy, SlotPolicy, SlotTable, StandardSlots};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub schema_version: u32,
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default)]
    pub otn_nodes: Vec<OtnNodeSpec>,
    #[serde(default)]
    pub signals: Vec<SignalSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub kind: NetNodeKind,
    #[serde(default)]
    pub role: RouteRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub from: String,
    pub to: String,
    pub length: f64,
    #[serde(default)]
    pub kind: LinkKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtnNodeSpec {
    /// 所在光层节点名称
    pub node: String,
    pub rules: Vec<AggregationRule>,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// 缺省为标准时隙表
    #[serde(default)]
    pub slots: Option<SlotTable>,
}

fn default_capacity() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSpec {
    pub source: String,
    pub target: String,
    pub bandwidth_gbps: f64,
    #[serde(default)]
    pub strategy: AggregationStrategy,
}

/// 构建结果及名称索引
#[derive(Debug)]
pub struct BuiltNetwork {
    pub net: Network,
    pub nodes: HashMap<String, NodeId>,
    pub otn_nodes: HashMap<String, OtnNodeId>,
    pub signals: Vec<SignalId>,
}

impl BuiltNetwork {
    pub fn node(&self, name: &str) -> Result<NodeId, SpecError> {
        self.nodes
            .get(name)
            .copied()
            .ok_or_else(|| SpecError::UnknownName(name.to_string()))
    }

    pub fn otn_node(&self, name: &str) -> Result<OtnNodeId, SpecError> {
        self.otn_nodes
            .get(name)
            .copied()
            .ok_or_else(|| SpecError::UnknownName(name.to_string()))
    }
}

impl NetworkSpec {
    pub fn from_json_str(raw: &str) -> Result<Self, SpecError> {
        let spec: NetworkSpec = serde_json::from_str(raw)?;
        if spec.schema_version != SCHEMA_VERSION {
            return Err(SpecError::UnsupportedSchema(spec.schema_version));
        }
        Ok(spec)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// 按描述构建网络；节点上声明的路由角色会保留在网络中
    pub fn build(&self) -> Result<BuiltNetwork, SpecError> {
        let mut net = Network::default();
        let mut nodes = HashMap::new();
        for n in &self.nodes {
            if nodes.contains_key(&n.name) {
                return Err(SpecError::DuplicateName(n.name.clone()));
            }
            let id = net.add_node(n.name.clone(), n.kind);
            net.set_route_role(id, n.role)?;
            nodes.insert(n.name.clone(), id);
        }

        let lookup = |name: &str| -> Result<NodeId, SpecError> {
            nodes
                .get(name)
                .copied()
                .ok_or_else(|| SpecError::UnknownName(name.to_string()))
        };

        for l in &self.links {
            net.add_link(lookup(&l.from)?, lookup(&l.to)?, l.length, l.kind)?;
        }

        let mut otn_nodes = HashMap::new();
        for o in &self.otn_nodes {
            let node = lookup(&o.node)?;
            let slots: Box<dyn SlotPolicy> = match &o.slots {
                Some(table) => Box::new(table.clone()),
                None => Box::new(StandardSlots),
            };
            let id = net.add_otn_node_with_slots(node, o.rules.iter().copied(), slots, o.capacity)?;
            otn_nodes.insert(o.node.clone(), id);
        }

        let mut signals = Vec::with_capacity(self.signals.len());
        for s in &self.signals {
            let source = *otn_nodes
                .get(&s.source)
                .ok_or_else(|| SpecError::UnknownName(s.source.clone()))?;
            let target = *otn_nodes
                .get(&s.target)
                .ok_or_else(|| SpecError::UnknownName(s.target.clone()))?;
            signals.push(net.add_signal(source, target, s.bandwidth_gbps, s.strategy)?);
        }

        info!(
            nodes = nodes.len(),
            links = net.links().len(),
            otn_nodes = otn_nodes.len(),
            signals = signals.len(),
            "网络构建完成"
        );

        Ok(BuiltNetwork {
            net,
            nodes,
            otn_nodes,
            signals,
        })
    }
}

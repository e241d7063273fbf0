//! 网络拓扑管理
//!
//! 光层：节点与光纤链路组成的有向图（无向链路插入两个方向）。
//! 电层：挂在光层节点上的汇聚节点，以及它们之间的客户信号。

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::id::{LinkId, NodeId, OtnNodeId, SignalId};
use super::link::{Link, LinkKind};
use super::node::{NetNode, NetNodeKind, RouteRole};
use crate::error::{Error, OtnError, TopologyError};
use crate::otn::{AggregationRule, AggregationStrategy, OtnLevel, OtnNode, Signal, SlotPolicy};

/// 电层图上的一条边：已登记的客户信号
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalRecord {
    pub id: SignalId,
    pub source: OtnNodeId,
    pub target: OtnNodeId,
    pub level: OtnLevel,
    pub bandwidth_gbps: f64,
}

/// 网络拓扑
#[derive(Debug, Default)]
pub struct Network {
    nodes: Vec<NetNode>,
    links: Vec<Link>,
    edges: HashMap<(NodeId, NodeId), LinkId>,
    out_links: Vec<Vec<LinkId>>,
    otn_nodes: Vec<OtnNode>,
    otn_by_node: HashMap<NodeId, OtnNodeId>,
    signals: BTreeMap<SignalId, SignalRecord>,
}

impl Network {
    /// 添加光层节点
    pub fn add_node(&mut self, name: impl Into<String>, kind: NetNodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NetNode::new(id, name, kind));
        self.out_links.push(Vec::new());
        id
    }

    /// 连接两个节点
    ///
    /// `LinkKind::Undirected` 会同时插入反向链路，两条链路长度相同且互为 reverse；
    /// 返回正向链路的 id。任一方向已存在链路时拒绝插入。
    pub fn add_link(
        &mut self,
        from: NodeId,
        to: NodeId,
        length: f64,
        kind: LinkKind,
    ) -> Result<LinkId, TopologyError> {
        self.check_node(from)?;
        self.check_node(to)?;
        if from == to {
            return Err(TopologyError::SelfLoop(from));
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(TopologyError::InvalidLength(length));
        }
        self.check_free(from, to)?;
        if kind == LinkKind::Undirected {
            self.check_free(to, from)?;
        }

        let fwd = self.push_link(from, to, length);
        if kind == LinkKind::Undirected {
            let rev = self.push_link(to, from, length);
            self.links[fwd.0].reverse = Some(rev);
            self.links[rev.0].reverse = Some(fwd);
        }
        trace!(?from, ?to, length, ?kind, link = ?fwd, "添加链路");
        Ok(fwd)
    }

    pub fn node(&self, id: NodeId) -> Option<&NetNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[NetNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 按名称查找节点（线性扫描）
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.name() == name).map(|n| n.id())
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.0)
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// `from -> to` 方向的链路
    pub fn find_link(&self, from: NodeId, to: NodeId) -> Option<LinkId> {
        self.edges.get(&(from, to)).copied()
    }

    /// 从节点出发的所有链路；未知节点返回空
    pub fn out_links(&self, node: NodeId) -> &[LinkId] {
        self.out_links.get(node.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn route_role(&self, node: NodeId) -> Option<RouteRole> {
        self.nodes.get(node.0).map(|n| n.role)
    }

    /// 设置节点的路由角色
    pub fn set_route_role(&mut self, node: NodeId, role: RouteRole) -> Result<(), TopologyError> {
        let n = self
            .nodes
            .get_mut(node.0)
            .ok_or(TopologyError::UnknownNode(node))?;
        n.role = role;
        Ok(())
    }

    /// 把所有节点的路由角色恢复为 `Undefined`
    pub fn reset_route_roles(&mut self) {
        for n in &mut self.nodes {
            n.role = RouteRole::Undefined;
        }
    }

    /// 临时标记路由角色并执行 `f`，返回前把标记过的节点恢复为 `Undefined`。
    pub fn with_route_roles<R>(
        &mut self,
        marks: &[(NodeId, RouteRole)],
        f: impl FnOnce(&Network) -> R,
    ) -> Result<R, TopologyError> {
        for &(node, _) in marks {
            self.check_node(node)?;
        }
        for &(node, role) in marks {
            self.nodes[node.0].role = role;
        }
        let out = f(self);
        for &(node, _) in marks {
            self.nodes[node.0].role = RouteRole::Undefined;
        }
        Ok(out)
    }

    /// 在光层节点上挂载汇聚节点（标准时隙表）
    pub fn add_otn_node(
        &mut self,
        node: NodeId,
        rules: impl IntoIterator<Item = AggregationRule>,
        capacity: usize,
    ) -> Result<OtnNodeId, Error> {
        self.add_otn_node_with_slots(node, rules, Box::new(crate::otn::StandardSlots), capacity)
    }

    /// 在光层节点上挂载汇聚节点（自定义时隙策略）
    pub fn add_otn_node_with_slots(
        &mut self,
        node: NodeId,
        rules: impl IntoIterator<Item = AggregationRule>,
        slots: Box<dyn SlotPolicy>,
        capacity: usize,
    ) -> Result<OtnNodeId, Error> {
        self.check_node(node)?;
        if self.otn_by_node.contains_key(&node) {
            return Err(TopologyError::DuplicateOtnNode(node).into());
        }
        let id = OtnNodeId(self.otn_nodes.len());
        let mut otn = OtnNode::with_slots(id, rules, slots, capacity)?;
        otn.net_node = Some(node);
        self.otn_nodes.push(otn);
        self.otn_by_node.insert(node, id);
        Ok(id)
    }

    pub fn otn_node(&self, id: OtnNodeId) -> Option<&OtnNode> {
        self.otn_nodes.get(id.0)
    }

    pub fn otn_node_mut(&mut self, id: OtnNodeId) -> Option<&mut OtnNode> {
        self.otn_nodes.get_mut(id.0)
    }

    pub fn otn_nodes(&self) -> &[OtnNode] {
        &self.otn_nodes
    }

    /// 光层节点上挂载的汇聚节点
    pub fn otn_node_at(&self, node: NodeId) -> Option<OtnNodeId> {
        self.otn_by_node.get(&node).copied()
    }

    /// 在两个汇聚节点之间建立客户信号
    ///
    /// 客户带宽先映射到最小 ODU 等级，在源节点汇聚；随后只把从顶层容器到该客户
    /// 的分支同步到目的节点（已有的同 id 容器直接复用，否则在目的节点汇聚），
    /// 同一容器中发往其他节点的信号不会被带过去。目的节点失败时回滚源节点。
    #[tracing::instrument(skip(self))]
    pub fn add_signal(
        &mut self,
        source: OtnNodeId,
        target: OtnNodeId,
        bandwidth_gbps: f64,
        strategy: AggregationStrategy,
    ) -> Result<SignalId, Error> {
        self.check_otn_node(source)?;
        self.check_otn_node(target)?;

        let client = Signal::new(source, target, bandwidth_gbps).to_otn()?;
        let id = client.id;
        let level = client.level;

        self.otn_nodes[source.0].try_aggregate(client, strategy)?;

        if source != target {
            let branch = self.otn_nodes[source.0]
                .branch_of(id)
                .ok_or(OtnError::SignalNotFound(id))?;
            if let Err(e) = self.otn_nodes[target.0].graft(branch, strategy) {
                debug!(error = %e, "目的节点汇聚失败，回滚源节点");
                if let Err(rollback) = self.otn_nodes[source.0].try_de_aggregate(id) {
                    warn!(error = %rollback, "源节点回滚失败");
                }
                return Err(e.into());
            }
        }

        self.signals.insert(
            id,
            SignalRecord {
                id,
                source,
                target,
                level,
                bandwidth_gbps,
            },
        );
        info!(signal = ?id, %level, "客户信号已建立");
        Ok(id)
    }

    /// 拆除客户信号：从两端节点解汇聚并注销
    ///
    /// 任一端不再持有该信号时返回 `SignalNotFound`，网络保持不变。
    #[tracing::instrument(skip(self))]
    pub fn remove_signal(&mut self, id: SignalId) -> Result<SignalRecord, Error> {
        let record = *self.signals.get(&id).ok_or(OtnError::SignalNotFound(id))?;
        for end in [record.source, record.target] {
            if !self.otn_nodes[end.0].contains(id) {
                warn!(otn_node = ?end, "端节点已不持有该信号");
                return Err(OtnError::SignalNotFound(id).into());
            }
        }
        self.otn_nodes[record.source.0].try_de_aggregate(id)?;
        if record.target != record.source {
            self.otn_nodes[record.target.0].try_de_aggregate(id)?;
        }
        self.signals.remove(&id);
        info!("客户信号已拆除");
        Ok(record)
    }

    /// 已登记的客户信号（电层图的边）
    pub fn signals(&self) -> impl Iterator<Item = &SignalRecord> {
        self.signals.values()
    }

    pub fn signal(&self, id: SignalId) -> Option<&SignalRecord> {
        self.signals.get(&id)
    }

    fn push_link(&mut self, from: NodeId, to: NodeId, length: f64) -> LinkId {
        let id = LinkId(self.links.len());
        self.links.push(Link::new(id, from, to, length));
        self.edges.insert((from, to), id);
        self.out_links[from.0].push(id);
        id
    }

    fn check_node(&self, node: NodeId) -> Result<(), TopologyError> {
        if node.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(TopologyError::UnknownNode(node))
        }
    }

    fn check_otn_node(&self, node: OtnNodeId) -> Result<(), TopologyError> {
        if node.0 < self.otn_nodes.len() {
            Ok(())
        } else {
            Err(TopologyError::UnknownOtnNode(node))
        }
    }

    fn check_free(&self, from: NodeId, to: NodeId) -> Result<(), TopologyError> {
        match self.edges.get(&(from, to)) {
            Some(&existing) => Err(TopologyError::DuplicateLink { from, to, existing }),
            None => Ok(()),
        }
    }
}

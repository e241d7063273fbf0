//! 电层汇聚节点
//!
//! 持有一组经过校验的汇聚规则、一张时隙表，以及容量受限的顶层容器集合。
//! 客户信号按策略装入已有容器，装不下时新建中间容器并逐级上浮，直到并入
//! 已有容器或成为新的顶层容器。失败时节点状态保持不变。

use std::collections::HashSet;

use tracing::{debug, trace};

use super::level::OtnLevel;
use super::rule::{AggregationRule, RuleSet};
use super::signal::OtnSignal;
use super::slots::{SlotPolicy, StandardSlots};
use super::strategy::{AggregationStrategy, Candidate};
use crate::error::OtnError;
use crate::net::{NodeId, OtnNodeId, SignalId};

/// 电层汇聚节点
#[derive(Debug)]
pub struct OtnNode {
    id: OtnNodeId,
    pub(crate) net_node: Option<NodeId>,
    rules: RuleSet,
    slots: Box<dyn SlotPolicy>,
    capacity: usize,
    signals: Vec<OtnSignal>,
    index: HashSet<SignalId>,
}

impl OtnNode {
    /// 使用标准时隙表创建节点
    pub fn new(
        id: OtnNodeId,
        rules: impl IntoIterator<Item = AggregationRule>,
        capacity: usize,
    ) -> Result<Self, OtnError> {
        Self::with_slots(id, rules, Box::new(StandardSlots), capacity)
    }

    /// 使用自定义时隙策略创建节点；规则集不合法时返回 `InvalidRuleSet`。
    pub fn with_slots(
        id: OtnNodeId,
        rules: impl IntoIterator<Item = AggregationRule>,
        slots: Box<dyn SlotPolicy>,
        capacity: usize,
    ) -> Result<Self, OtnError> {
        let rules = RuleSet::new(rules)?;
        debug!(otn_node = ?id, apex = %rules.apex(), capacity, "创建汇聚节点");
        Ok(Self {
            id,
            net_node: None,
            rules,
            slots,
            capacity,
            signals: Vec::with_capacity(capacity),
            index: HashSet::new(),
        })
    }

    pub fn id(&self) -> OtnNodeId {
        self.id
    }

    /// 所在的光层节点
    pub fn net_node(&self) -> Option<NodeId> {
        self.net_node
    }

    /// 顶层等级
    pub fn apex(&self) -> OtnLevel {
        self.rules.apex()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn slot_policy(&self) -> &dyn SlotPolicy {
        self.slots.as_ref()
    }

    /// 顶层容器（按加入顺序）
    pub fn signals(&self) -> &[OtnSignal] {
        &self.signals
    }

    /// 整个层级中的信号总数
    pub fn signal_count(&self) -> usize {
        self.signals.iter().map(|s| 1 + s.descendant_count()).sum()
    }

    /// 在整个层级中按 id 查找信号
    pub fn signal(&self, id: SignalId) -> Option<&OtnSignal> {
        self.signals
            .iter()
            .find_map(|s| if s.id == id { Some(s) } else { s.find(id) })
    }

    /// 包含 `id` 的顶层容器
    pub fn top_level_of(&self, id: SignalId) -> Option<&OtnSignal> {
        self.signals.iter().find(|s| s.contains(id))
    }

    pub fn contains(&self, id: SignalId) -> bool {
        self.index.contains(&id) || self.signals.iter().any(|s| s.find(id).is_some())
    }

    /// 是否存在直接规则 `client -> container`
    pub fn is_aggregation_supported(&self, client: OtnLevel, container: OtnLevel) -> bool {
        self.rules.supports(client, container)
    }

    /// 是否存在规则链 `client -> ... -> container`
    pub fn is_aggregation_supported_transitive(&self, client: OtnLevel, container: OtnLevel) -> bool {
        self.rules.supports_transitive(client, container)
    }

    /// 规则链上的第一跳等级
    pub fn transitive_next_hop(&self, client: OtnLevel, container: OtnLevel) -> Option<OtnLevel> {
        self.rules.next_hop(client, container)
    }

    /// 将客户信号装入节点，返回最终承载它的容器 id。
    ///
    /// 顶层等级的信号按“接纳”处理：已存在则直接返回，否则在容量允许时加入。
    /// 其余等级先按策略在现有容器（含各层嵌套容器及被接纳的顶层信号，不含嵌套的客户信号）中挑选；找不到时沿规则链
    /// 新建下一跳等级的容器包裹它，再把新容器当作客户继续上浮。
    #[tracing::instrument(skip(self, client), fields(otn_node = ?self.id, client = ?client.id, level = %client.level))]
    pub fn try_aggregate(
        &mut self,
        client: OtnSignal,
        strategy: AggregationStrategy,
    ) -> Result<SignalId, OtnError> {
        let apex = self.rules.apex();
        let mut pending = client;

        loop {
            if pending.level == apex {
                return self.admit(pending);
            }

            pending = match self.place(pending, strategy) {
                Ok(container) => return Ok(container),
                Err(rejected) => rejected,
            };

            let Some(next) = self.rules.next_hop(pending.level, apex) else {
                return Err(OtnError::NoAggregationPath {
                    client: pending.level,
                    apex,
                });
            };

            let mut container = OtnSignal::container(next, pending.source, pending.target);
            if let Err(rejected) = container.embed(pending, self.slots.as_ref()) {
                return Err(if rejected.level.matches_bandwidth(rejected.bandwidth_gbps) {
                    OtnError::CapacityExceeded {
                        level: next,
                        capacity: self.slots.slots_available(next) as usize,
                    }
                } else {
                    OtnError::LevelMismatch {
                        bandwidth_gbps: rejected.bandwidth_gbps,
                        level: Some(rejected.level),
                    }
                });
            }
            debug!(container = ?container.id, level = %next, "新建容器并继续上浮");
            pending = container;
        }
    }

    /// 从节点层级中移除信号，返回其直接父容器 id。
    ///
    /// 父容器因此变空时会被一并移除，并继续向上级联；顶层容器变空后也从节点中删除。
    /// 若 `id` 本身就是顶层信号，则直接删除并返回它自己的 id。
    #[tracing::instrument(skip(self), fields(otn_node = ?self.id))]
    pub fn try_de_aggregate(&mut self, id: SignalId) -> Result<SignalId, OtnError> {
        for t in 0..self.signals.len() {
            if self.signals[t].id == id {
                self.signals.remove(t);
                self.index.remove(&id);
                debug!("移除顶层信号");
                return Ok(id);
            }

            let mut dropped = Vec::new();
            if let Some(parent) = self.signals[t].remove_descendant(id, &mut dropped) {
                if self.signals[t].is_empty() {
                    let top = self.signals.remove(t);
                    self.index.remove(&top.id);
                    dropped.push(top.id);
                }
                debug!(parent = ?parent, dropped = ?dropped, "解汇聚完成");
                return Ok(parent);
            }
        }
        Err(OtnError::SignalNotFound(id))
    }

    /// `id` 所在分支的快照：从顶层容器到 `id`，不含旁支上的其他信号
    pub fn branch_of(&self, id: SignalId) -> Option<OtnSignal> {
        self.signals.iter().find_map(|top| top.branch(id))
    }

    /// 把其他节点上的分支快照并入本节点，返回分支根所在的顶层信号 id。
    ///
    /// 分支上已有的容器在本节点存在时直接复用；一个都不存在时整体按 `strategy` 汇聚。
    /// 失败时节点状态保持不变。
    pub(crate) fn graft(
        &mut self,
        branch: OtnSignal,
        strategy: AggregationStrategy,
    ) -> Result<SignalId, OtnError> {
        let slots = self.slots.as_ref();
        for top in &mut self.signals {
            let top_id = top.id;
            let Some(anchor) = top.find_mut(branch.id) else {
                continue;
            };
            anchor.merge_branch(branch, slots)?;
            debug!(top = ?top_id, "分支并入已有容器");
            return Ok(top_id);
        }
        self.try_aggregate(branch, strategy)
    }

    fn admit(&mut self, mut signal: OtnSignal) -> Result<SignalId, OtnError> {
        if self.index.contains(&signal.id) {
            trace!(signal = ?signal.id, "顶层信号已存在");
            return Ok(signal.id);
        }
        if self.signals.len() >= self.capacity {
            return Err(OtnError::CapacityExceeded {
                level: self.rules.apex(),
                capacity: self.capacity,
            });
        }
        signal.mark_container();
        let id = signal.id;
        self.index.insert(id);
        self.signals.push(signal);
        debug!(signal = ?id, top_level = self.signals.len(), "接纳顶层信号");
        Ok(id)
    }

    /// 按策略在现有容器中放置客户；没有合适容器时原样返回 Err(client)
    fn place(
        &mut self,
        client: OtnSignal,
        strategy: AggregationStrategy,
    ) -> Result<SignalId, OtnSignal> {
        let slots = self.slots.as_ref();
        let required = slots.slots_required(client.level);

        let mut candidates: Vec<Candidate> = Vec::new();
        for (t, top) in self.signals.iter().enumerate() {
            top.walk(&mut Vec::new(), &mut |rel, s| {
                if s.is_container()
                    && self.rules.supports(client.level, s.level)
                    && s.can_aggregate(&client, slots)
                {
                    let mut path = Vec::with_capacity(rel.len() + 1);
                    path.push(t);
                    path.extend_from_slice(rel);
                    candidates.push(Candidate {
                        path,
                        id: s.id,
                        free_after: s.free_slots(slots) - required,
                    });
                }
            });
        }
        trace!(candidates = candidates.len(), ?strategy, "候选容器");

        let Some(pick) = strategy.select(&candidates) else {
            return Err(client);
        };
        let Some((&top, rest)) = candidates[pick].path.split_first() else {
            return Err(client);
        };
        let Some(container) = self.signals[top].at_path_mut(rest) else {
            return Err(client);
        };
        let id = container.id;
        container.embed(client, slots)?;
        debug!(container = ?id, "装入已有容器");
        Ok(id)
    }
}

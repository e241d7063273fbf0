//! 信号类型
//!
//! `Signal` 是带任意带宽的客户信号；`OtnSignal` 是映射到某个 ODU 等级后的信号，
//! 作为容器时独占其直接承载的子信号，移除容器即移除整棵子树。

use serde::Serialize;

use super::level::{BANDWIDTH_TOLERANCE_GBPS, OtnLevel};
use super::slots::SlotPolicy;
use crate::error::OtnError;
use crate::net::{OtnNodeId, SignalId};

/// 客户信号
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub id: SignalId,
    pub bandwidth_gbps: f64,
    pub source: OtnNodeId,
    pub target: OtnNodeId,
}

impl Signal {
    pub fn new(source: OtnNodeId, target: OtnNodeId, bandwidth_gbps: f64) -> Self {
        Self {
            id: SignalId::fresh(),
            bandwidth_gbps,
            source,
            target,
        }
    }

    /// 映射到能承载它的最小 ODU 等级
    ///
    /// 这是客户原始带宽进入汇聚引擎的唯一入口；映射后信号带宽即等级标称带宽。
    pub fn to_otn(&self) -> Result<OtnSignal, OtnError> {
        let level = OtnLevel::for_bandwidth(self.bandwidth_gbps)?;
        self.to_otn_at(level)
    }

    /// 映射到指定等级，只要求带宽不超过标称带宽（含容差）
    pub fn to_otn_at(&self, level: OtnLevel) -> Result<OtnSignal, OtnError> {
        if !self.bandwidth_gbps.is_finite()
            || self.bandwidth_gbps > level.expected_bandwidth_gbps() + BANDWIDTH_TOLERANCE_GBPS
        {
            return Err(OtnError::LevelMismatch {
                bandwidth_gbps: self.bandwidth_gbps,
                level: Some(level),
            });
        }
        Ok(OtnSignal {
            id: self.id,
            bandwidth_gbps: level.expected_bandwidth_gbps(),
            level,
            source: self.source,
            target: self.target,
            container: false,
            children: Vec::new(),
        })
    }
}

/// ODU 信号（可作为容器）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtnSignal {
    pub id: SignalId,
    pub bandwidth_gbps: f64,
    pub level: OtnLevel,
    pub source: OtnNodeId,
    pub target: OtnNodeId,
    /// 由汇聚引擎创建的复用容器；包装得到的客户信号为 false
    container: bool,
    children: Vec<OtnSignal>,
}

impl OtnSignal {
    /// 新建一个空容器，带宽取等级标称带宽
    pub fn container(level: OtnLevel, source: OtnNodeId, target: OtnNodeId) -> Self {
        Self {
            id: SignalId::fresh(),
            bandwidth_gbps: level.expected_bandwidth_gbps(),
            level,
            source,
            target,
            container: true,
            children: Vec::new(),
        }
    }

    /// 是否为汇聚引擎创建的容器（只有容器会被选作装箱目标）
    pub fn is_container(&self) -> bool {
        self.container
    }

    /// 直接承载的子信号（按装入顺序）
    pub fn children(&self) -> &[OtnSignal] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// 已占用时隙，始终由当前子信号重新计算
    pub fn used_slots(&self, slots: &dyn SlotPolicy) -> u32 {
        self.children
            .iter()
            .map(|c| slots.slots_required(c.level))
            .sum()
    }

    pub fn free_slots(&self, slots: &dyn SlotPolicy) -> u32 {
        slots
            .slots_available(self.level)
            .saturating_sub(self.used_slots(slots))
    }

    /// 该容器能否装入 `client`
    pub fn can_aggregate(&self, client: &OtnSignal, slots: &dyn SlotPolicy) -> bool {
        if client.level >= self.level {
            return false;
        }
        if !client.level.matches_bandwidth(client.bandwidth_gbps) {
            return false;
        }
        if !self.level.matches_bandwidth(self.bandwidth_gbps) {
            return false;
        }
        self.used_slots(slots) + slots.slots_required(client.level)
            <= slots.slots_available(self.level)
    }

    /// 装入子信号：成功返回 Ok；不满足条件则原样返回 Err(client)
    pub fn embed(&mut self, client: OtnSignal, slots: &dyn SlotPolicy) -> Result<(), OtnSignal> {
        if !self.can_aggregate(&client, slots) {
            return Err(client);
        }
        self.children.push(client);
        Ok(())
    }

    /// 在子树中按 id 查找（不含自身）
    pub fn find(&self, id: SignalId) -> Option<&OtnSignal> {
        let mut stack: Vec<&OtnSignal> = self.children.iter().collect();
        while let Some(s) = stack.pop() {
            if s.id == id {
                return Some(s);
            }
            stack.extend(s.children.iter());
        }
        None
    }

    /// 子树中是否包含 `id`（含自身）
    pub fn contains(&self, id: SignalId) -> bool {
        self.id == id || self.find(id).is_some()
    }

    /// 子树（不含自身）中的信号总数
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    /// 深度优先遍历整棵树（含自身），回调参数为 (索引路径, 信号)
    pub(crate) fn walk<'a>(&'a self, path: &mut Vec<usize>, f: &mut impl FnMut(&[usize], &'a OtnSignal)) {
        f(path, self);
        for (i, child) in self.children.iter().enumerate() {
            path.push(i);
            child.walk(path, f);
            path.pop();
        }
    }

    /// 沿索引路径定位子孙容器（空路径即自身）
    pub(crate) fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut OtnSignal> {
        let mut cur = self;
        for &i in path {
            cur = cur.children.get_mut(i)?;
        }
        Some(cur)
    }

    /// 从子树中移除 `id`，返回其直接父容器的 id。
    ///
    /// 移除后变空的中间容器会被一并移除（向上级联，止于 `self`）；
    /// `self` 本身是否变空由调用方处理。
    pub(crate) fn remove_descendant(
        &mut self,
        id: SignalId,
        dropped: &mut Vec<SignalId>,
    ) -> Option<SignalId> {
        if let Some(pos) = self.children.iter().position(|c| c.id == id) {
            self.children.remove(pos);
            return Some(self.id);
        }
        for i in 0..self.children.len() {
            if let Some(parent) = self.children[i].remove_descendant(id, dropped) {
                if self.children[i].is_empty() {
                    let emptied = self.children.remove(i);
                    dropped.push(emptied.id);
                }
                return Some(parent);
            }
        }
        None
    }

    /// 以顶层方式被接纳的信号也可承载更低等级的客户
    pub(crate) fn mark_container(&mut self) {
        self.container = true;
    }

    /// 在整棵树（含自身）中按 id 查找可变引用
    pub(crate) fn find_mut(&mut self, id: SignalId) -> Option<&mut OtnSignal> {
        let mut stack: Vec<&mut OtnSignal> = vec![self];
        while let Some(s) = stack.pop() {
            if s.id == id {
                return Some(s);
            }
            stack.extend(s.children.iter_mut());
        }
        None
    }

    /// 从 `self` 到 `id` 的分支快照：沿途容器只保留通往 `id` 的那个子信号，
    /// `id` 本身连同其子树完整保留。`id` 不在树中时返回 `None`。
    pub(crate) fn branch(&self, id: SignalId) -> Option<OtnSignal> {
        if self.id == id {
            return Some(self.clone());
        }
        let inner = self.children.iter().find_map(|c| c.branch(id))?;
        Some(OtnSignal {
            children: vec![inner],
            ..self.shallow()
        })
    }

    /// 把以 `self.id` 为根的分支并入 `self`
    ///
    /// 已存在的层级原样复用，只在第一个缺失的位置装入剩余子树；
    /// 装不下时返回错误，此时 `self` 未被修改。
    pub(crate) fn merge_branch(
        &mut self,
        branch: OtnSignal,
        slots: &dyn SlotPolicy,
    ) -> Result<(), OtnError> {
        let mut dst = self;
        let mut cur = branch;
        while let Some(next) = cur.children.pop() {
            match dst.children.iter().position(|c| c.id == next.id) {
                Some(i) => {
                    dst = &mut dst.children[i];
                    cur = next;
                }
                None => {
                    let level = dst.level;
                    return dst.embed(next, slots).map_err(|rest| {
                        if rest.level.matches_bandwidth(rest.bandwidth_gbps) {
                            OtnError::CapacityExceeded {
                                level,
                                capacity: slots.slots_available(level) as usize,
                            }
                        } else {
                            OtnError::LevelMismatch {
                                bandwidth_gbps: rest.bandwidth_gbps,
                                level: Some(rest.level),
                            }
                        }
                    });
                }
            }
        }
        Ok(())
    }

    fn shallow(&self) -> OtnSignal {
        OtnSignal {
            id: self.id,
            bandwidth_gbps: self.bandwidth_gbps,
            level: self.level,
            source: self.source,
            target: self.target,
            container: self.container,
            children: Vec::new(),
        }
    }
}

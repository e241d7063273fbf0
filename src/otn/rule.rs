//! 汇聚规则
//!
//! `AggregationRule` 声明某一等级可以直接装入另一更高等级；
//! `RuleSet` 在构建时校验所有等级都能（可传递地）到达顶层等级。

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::level::OtnLevel;
use crate::error::OtnError;

/// 汇聚规则：`client` 等级的信号可直接装入 `container` 等级的容器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregationRule {
    pub client: OtnLevel,
    pub container: OtnLevel,
}

impl AggregationRule {
    pub fn new(client: OtnLevel, container: OtnLevel) -> Result<Self, OtnError> {
        if client >= container {
            return Err(OtnError::InvalidRule { client, container });
        }
        Ok(Self { client, container })
    }
}

/// 经过校验的规则集合
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<AggregationRule>,
    apex: OtnLevel,
}

impl RuleSet {
    /// 校验并构建规则集
    ///
    /// 最大的 container 等级即顶层（apex）等级。每个出现过的 client 等级，
    /// 以及每个非顶层的 container 等级，都必须存在一条到达顶层的规则链。
    pub fn new(rules: impl IntoIterator<Item = AggregationRule>) -> Result<Self, OtnError> {
        let rules: Vec<AggregationRule> = rules.into_iter().collect();
        for r in &rules {
            if r.client >= r.container {
                return Err(OtnError::InvalidRule {
                    client: r.client,
                    container: r.container,
                });
            }
        }
        let apex = rules
            .iter()
            .map(|r| r.container)
            .max()
            .ok_or_else(|| OtnError::InvalidRuleSet("empty rule set".to_string()))?;

        let set = Self { rules, apex };

        let mut clients: Vec<OtnLevel> = set.rules.iter().map(|r| r.client).collect();
        clients.sort();
        clients.dedup();
        for level in clients {
            if set.next_hop(level, apex).is_none() {
                return Err(OtnError::InvalidRuleSet(format!(
                    "client level {level} cannot reach apex {apex}"
                )));
            }
        }

        let mut containers: Vec<OtnLevel> = set
            .rules
            .iter()
            .map(|r| r.container)
            .filter(|&c| c != apex)
            .collect();
        containers.sort();
        containers.dedup();
        for level in containers {
            if set.next_hop(level, apex).is_none() {
                return Err(OtnError::InvalidRuleSet(format!(
                    "container level {level} cannot reach apex {apex}"
                )));
            }
        }

        Ok(set)
    }

    pub fn apex(&self) -> OtnLevel {
        self.apex
    }

    pub fn rules(&self) -> &[AggregationRule] {
        &self.rules
    }

    /// 是否存在直接规则 `client -> container`
    pub fn supports(&self, client: OtnLevel, container: OtnLevel) -> bool {
        client < container
            && self
                .rules
                .iter()
                .any(|r| r.client == client && r.container == container)
    }

    /// 是否存在规则链 `client -> ... -> container`
    pub fn supports_transitive(&self, client: OtnLevel, container: OtnLevel) -> bool {
        self.next_hop(client, container).is_some()
    }

    /// 查找一条 `client` 到 `container` 的规则链，返回链上的第一跳等级。
    ///
    /// 深度优先，候选下一跳按等级从高到低探索；已访问等级直接剪枝。
    /// 找到的是“某一条”合法链，不保证最便宜。
    pub fn next_hop(&self, client: OtnLevel, container: OtnLevel) -> Option<OtnLevel> {
        if client >= container {
            return None;
        }

        let mut visited: HashSet<OtnLevel> = HashSet::new();
        // (当前等级, 到达该等级所经过的第一跳)
        let mut stack: Vec<(OtnLevel, Option<OtnLevel>)> = vec![(client, None)];

        while let Some((current, first_hop)) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if self.supports(current, container) {
                return Some(first_hop.unwrap_or(container));
            }

            let mut next: Vec<OtnLevel> = self
                .rules
                .iter()
                .filter(|r| r.client == current)
                .map(|r| r.container)
                .collect();
            // 升序入栈，出栈时先探索最高等级
            next.sort();
            next.dedup();
            for level in next {
                if !visited.contains(&level) {
                    stack.push((level, Some(first_hop.unwrap_or(level))));
                }
            }
        }
        None
    }
}

//! 装箱策略
//!
//! 在节点现有容器中为客户信号挑选一个目标容器。

use serde::{Deserialize, Serialize};

use crate::net::SignalId;

/// 装箱策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationStrategy {
    /// 最近创建的容器优先
    #[default]
    NextFit,
    /// 最早创建的容器优先
    FirstFit,
    /// 装入后剩余时隙最少的容器
    BestFit,
    /// 装入后剩余时隙最多的容器
    WorstFit,
}

/// 一个已满足规则与时隙条件的候选容器
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    /// 顶层容器下标，随后是逐层子信号下标
    pub path: Vec<usize>,
    pub id: SignalId,
    /// 装入客户后剩余的时隙
    pub free_after: u32,
}

impl AggregationStrategy {
    /// 从候选中选出一个，返回其下标。平手时取创建最早者。
    pub(crate) fn select(self, candidates: &[Candidate]) -> Option<usize> {
        let oldest_first = || {
            let mut order: Vec<usize> = (0..candidates.len()).collect();
            order.sort_by_key(|&i| candidates[i].id);
            order
        };
        match self {
            AggregationStrategy::NextFit => (0..candidates.len()).max_by_key(|&i| candidates[i].id),
            AggregationStrategy::FirstFit => (0..candidates.len()).min_by_key(|&i| candidates[i].id),
            AggregationStrategy::BestFit => oldest_first()
                .into_iter()
                .fold(None, |best: Option<usize>, i| match best {
                    Some(b) if candidates[b].free_after <= candidates[i].free_after => Some(b),
                    _ => Some(i),
                }),
            AggregationStrategy::WorstFit => oldest_first()
                .into_iter()
                .fold(None, |best: Option<usize>, i| match best {
                    Some(b) if candidates[b].free_after >= candidates[i].free_after => Some(b),
                    _ => Some(i),
                }),
        }
    }
}

//! K 条最短路径（Yen 算法变体）
//!
//! 每一轮以最近接受的路径为基准，对其每个偏离点（spur）做一次受限搜索：
//! 与该路径共享同一根前缀的已接受路径，其在偏离点处的下一条链路被删除；
//! 根前缀上偏离点之前的节点被禁止经过。各偏离点的搜索互相独立，使用 rayon
//! 在全局线程池上并行执行，每个任务持有自己的 `WeightOverlay`，不修改网络状态。

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use rayon::prelude::*;
use tracing::{debug, trace};

use super::dijkstra::ShortestPathTree;
use super::path::Path;
use super::weight::WeightOverlay;
use crate::error::RoutingError;
use crate::net::{LinkId, Network, NodeId};

/// K 最短路径搜索参数
#[derive(Debug, Clone, Copy)]
pub struct KspOptions {
    /// 同一轮中并行执行的偏离点搜索上限（不超过 k）；在 rayon 全局线程池上执行
    pub max_parallel_spurs: usize,
}

impl Default for KspOptions {
    fn default() -> Self {
        Self {
            max_parallel_spurs: 8,
        }
    }
}

/// 候选路径：按代价升序，代价相同时按链路序列排序
struct Candidate(Path);

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.0.cost.total_cmp(&other.0.cost) {
            Ordering::Equal => self.0.links.cmp(&other.0.links),
            ord => ord,
        }
        .reverse()
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Network {
    /// 使用默认参数查找至多 `k` 条互不相同的最短路径
    pub fn find_k_shortest_paths(
        &self,
        source: NodeId,
        target: NodeId,
        k: usize,
    ) -> Result<Vec<Path>, RoutingError> {
        self.find_k_shortest_paths_with(source, target, k, &KspOptions::default())
    }

    /// 查找至多 `k` 条互不相同的最短路径，按代价升序返回。
    ///
    /// 第一条即无约束的最短路径，不存在时返回 `PathNotFound`；
    /// 偏离路径耗尽时返回少于 `k` 条，这不是错误。
    #[tracing::instrument(skip(self, opts))]
    pub fn find_k_shortest_paths_with(
        &self,
        source: NodeId,
        target: NodeId,
        k: usize,
        opts: &KspOptions,
    ) -> Result<Vec<Path>, RoutingError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let first = self.shortest_path(source, target)?;
        let mut seen: HashSet<Vec<LinkId>> = HashSet::new();
        seen.insert(first.links.clone());
        let mut accepted = vec![first];
        let mut candidates: BinaryHeap<Candidate> = BinaryHeap::new();

        let workers = opts.max_parallel_spurs.clamp(1, k);

        while accepted.len() < k {
            let last = &accepted[accepted.len() - 1];
            let last_nodes = last.nodes(self)?;
            let spurs = last_nodes.len().saturating_sub(1);

            // 全局线程池上至多切成 `workers` 段，每段串行处理若干偏离点
            let found: Vec<Option<Path>> = (0..spurs)
                .into_par_iter()
                .with_min_len(spurs.div_ceil(workers).max(1))
                .map(|idx| self.spur_path(idx, last, &last_nodes, &accepted, target))
                .collect::<Result<Vec<_>, _>>()?;

            for path in found.into_iter().flatten() {
                if seen.insert(path.links.clone()) {
                    trace!(cost = path.cost, hops = path.len(), "新候选路径");
                    candidates.push(Candidate(path));
                }
            }

            let Some(Candidate(next)) = candidates.pop() else {
                debug!(found = accepted.len(), "偏离路径已耗尽");
                break;
            };
            accepted.push(next);
        }

        debug!(paths = accepted.len(), "K 最短路径搜索完成");
        Ok(accepted)
    }

    /// 在 `last` 的第 `idx` 个节点处偏离，返回完整的候选路径
    fn spur_path(
        &self,
        idx: usize,
        last: &Path,
        last_nodes: &[NodeId],
        accepted: &[Path],
        target: NodeId,
    ) -> Result<Option<Path>, RoutingError> {
        let spur_node = last_nodes[idx];
        let root = &last.links[..idx];

        let mut overlay = WeightOverlay::new();
        for p in accepted {
            if p.links.len() > idx && p.links[..idx] == *root {
                overlay.remove_link(p.links[idx]);
            }
        }
        for &node in &last_nodes[..idx] {
            overlay.forbid_node(node);
        }

        let tree = ShortestPathTree::build(self, spur_node, &overlay)?;
        let Some(spur) = tree.links_to(self, target) else {
            return Ok(None);
        };

        let mut links = root.to_vec();
        links.extend(spur);
        Path::from_links(self, last.source, links).map(Some)
    }
}

//! 单源最短路径（Dijkstra）

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::path::Path;
use super::weight::WeightOverlay;
use crate::error::RoutingError;
use crate::net::{LinkId, Network, NodeId};

struct QueueEntry {
    cost: f64,
    node: NodeId,
}

// BinaryHeap 是 max-heap；我们需要最小代价优先，因此反向比较。
impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.cost.total_cmp(&other.cost) {
            Ordering::Equal => self.node.cmp(&other.node),
            ord => ord,
        }
        .reverse()
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

/// 以某个节点为根的最短路径树
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    source: NodeId,
    dist: Vec<f64>,
    prev: Vec<Option<LinkId>>,
}

impl ShortestPathTree {
    /// 在覆盖层权重下计算 `source` 出发的最短路径树
    pub fn build(net: &Network, source: NodeId, overlay: &WeightOverlay) -> Result<Self, RoutingError> {
        let n = net.node_count();
        if source.0 >= n {
            return Err(RoutingError::UnknownNode(source));
        }

        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<LinkId>> = vec![None; n];
        let mut q = BinaryHeap::new();

        dist[source.0] = 0.0;
        q.push(QueueEntry {
            cost: 0.0,
            node: source,
        });

        while let Some(QueueEntry { cost, node }) = q.pop() {
            if cost > dist[node.0] {
                continue; // stale
            }
            for &lid in net.out_links(node) {
                let Some(link) = net.link(lid) else { continue };
                let Some(w) = overlay.weight(net, link) else {
                    continue;
                };
                let next = cost + w;
                if next < dist[link.to.0] {
                    dist[link.to.0] = next;
                    prev[link.to.0] = Some(lid);
                    q.push(QueueEntry {
                        cost: next,
                        node: link.to,
                    });
                }
            }
        }

        Ok(Self { source, dist, prev })
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    /// 到 `node` 的最短代价；不可达时为 `None`
    pub fn cost_to(&self, node: NodeId) -> Option<f64> {
        self.dist.get(node.0).copied().filter(|d| d.is_finite())
    }

    /// 到 `target` 的链路序列；不可达时为 `None`
    pub fn links_to(&self, net: &Network, target: NodeId) -> Option<Vec<LinkId>> {
        self.cost_to(target)?;
        let mut links = Vec::new();
        let mut at = target;
        while at != self.source {
            let lid = self.prev[at.0]?;
            links.push(lid);
            at = net.link(lid)?.from;
        }
        links.reverse();
        Some(links)
    }
}

impl Network {
    /// 基础权重下 `source` 到 `target` 的最短路径
    pub fn shortest_path(&self, source: NodeId, target: NodeId) -> Result<Path, RoutingError> {
        self.shortest_path_with(source, target, &WeightOverlay::default())
    }

    /// 覆盖层权重下 `source` 到 `target` 的最短路径
    pub fn shortest_path_with(
        &self,
        source: NodeId,
        target: NodeId,
        overlay: &WeightOverlay,
    ) -> Result<Path, RoutingError> {
        if target.0 >= self.node_count() {
            return Err(RoutingError::UnknownNode(target));
        }
        let tree = ShortestPathTree::build(self, source, overlay)?;
        let links = tree.links_to(self, target).ok_or(RoutingError::PathNotFound {
            from: source,
            to: target,
        })?;
        Path::from_links(self, source, links)
    }
}

//! 必经节点路径
//!
//! 最近邻贪心：从源节点出发，每次前往代价最小的未访问必经节点（`InRoute`），
//! 全部访问后再前往目的节点，最后逐段拼接最短路径。这是启发式算法，
//! 不保证得到最优的哈密顿路径。

use std::collections::BTreeSet;

use tracing::debug;

use super::dijkstra::ShortestPathTree;
use super::path::Path;
use super::weight::WeightOverlay;
use crate::error::RoutingError;
use crate::net::{Network, NodeId, RouteRole};

impl Network {
    /// 经过所有 `InRoute` 节点、从 `source` 到 `target` 的路径
    #[tracing::instrument(skip(self))]
    pub fn find_must_pass_path(&self, source: NodeId, target: NodeId) -> Result<Path, RoutingError> {
        for node in [source, target] {
            if node.0 >= self.node_count() {
                return Err(RoutingError::UnknownNode(node));
            }
        }

        let mut remaining: BTreeSet<NodeId> = self
            .nodes()
            .iter()
            .filter(|n| n.role() == RouteRole::InRoute)
            .map(|n| n.id())
            .filter(|&id| id != source && id != target)
            .collect();

        let overlay = WeightOverlay::new();
        let mut tour = vec![source];
        let mut current = source;

        while let Some(&first_left) = remaining.iter().next() {
            let tree = ShortestPathTree::build(self, current, &overlay)?;
            let nearest = remaining
                .iter()
                .filter_map(|&n| tree.cost_to(n).map(|c| (c, n)))
                .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            let Some((cost, next)) = nearest else {
                return Err(RoutingError::PathNotFound {
                    from: current,
                    to: first_left,
                });
            };
            debug!(from = ?current, to = ?next, cost, "前往最近的必经节点");
            remaining.remove(&next);
            tour.push(next);
            current = next;
        }
        tour.push(target);

        let mut links = Vec::new();
        for leg in tour.windows(2) {
            links.extend(self.shortest_path(leg[0], leg[1])?.links);
        }
        Path::from_links(self, source, links)
    }
}

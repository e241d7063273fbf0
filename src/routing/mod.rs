//! 光层路由
//!
//! 链路权重覆盖层、Dijkstra 最短路径、K 最短路径以及必经节点路径。

mod dijkstra;
mod ksp;
mod must_pass;
mod path;
mod weight;

pub use dijkstra::ShortestPathTree;
pub use ksp::KspOptions;
pub use path::Path;
pub use weight::WeightOverlay;

//! 电层（OTN）模块
//!
//! ODU 等级、时隙策略、汇聚规则、信号以及汇聚节点。

mod level;
mod node;
mod rule;
mod signal;
mod slots;
mod strategy;

pub use level::{BANDWIDTH_TOLERANCE_GBPS, OtnLevel};
pub use node::OtnNode;
pub use rule::{AggregationRule, RuleSet};
pub use signal::{OtnSignal, Signal};
pub use slots::{SlotPolicy, SlotTable, StandardSlots};
pub use strategy::AggregationStrategy;

//! 标识符类型
//!
//! 定义光层节点、链路、电层（OTN）节点和信号的唯一标识符。

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// 光层节点标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// 链路标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkId(pub usize);

/// 电层汇聚节点标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OtnNodeId(pub usize);

/// 信号标识符
///
/// 进程内单调递增，因此数值越大表示创建得越晚。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SignalId(pub u64);

static NEXT_SIGNAL_ID: AtomicU64 = AtomicU64::new(1);

impl SignalId {
    /// 分配一个新的信号标识符
    pub fn fresh() -> Self {
        SignalId(NEXT_SIGNAL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

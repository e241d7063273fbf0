//! 支路时隙策略
//!
//! 每个等级作为客户时占用的时隙数，以及作为容器时提供的时隙数。

use serde::{Deserialize, Serialize};

use super::level::OtnLevel;

/// 支路时隙策略抽象
///
/// 默认方法即标准时隙表：ODU0/1/2/3/4 分别占用 1/2/8/32/80 个时隙，
/// ODU1..ODU4 作为容器分别提供 2/8/32/80 个时隙，ODU0 只能作为叶子。
pub trait SlotPolicy: std::fmt::Debug + Send + Sync {
    fn slots_required(&self, level: OtnLevel) -> u32 {
        match level {
            OtnLevel::Odu0 => 1,
            OtnLevel::Odu1 => 2,
            OtnLevel::Odu2 => 8,
            OtnLevel::Odu3 => 32,
            OtnLevel::Odu4 => 80,
        }
    }

    fn slots_available(&self, level: OtnLevel) -> u32 {
        match level {
            OtnLevel::Odu0 => 0,
            OtnLevel::Odu1 => 2,
            OtnLevel::Odu2 => 8,
            OtnLevel::Odu3 => 32,
            OtnLevel::Odu4 => 80,
        }
    }
}

/// 标准时隙表
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardSlots;

impl SlotPolicy for StandardSlots {}

/// 可配置的时隙表，按 ODU0..ODU4 顺序给出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTable {
    pub required: [u32; 5],
    pub available: [u32; 5],
}

impl Default for SlotTable {
    fn default() -> Self {
        let standard = StandardSlots;
        Self {
            required: OtnLevel::ALL.map(|l| standard.slots_required(l)),
            available: OtnLevel::ALL.map(|l| standard.slots_available(l)),
        }
    }
}

impl SlotPolicy for SlotTable {
    fn slots_required(&self, level: OtnLevel) -> u32 {
        self.required[level.index()]
    }

    fn slots_available(&self, level: OtnLevel) -> u32 {
        self.available[level.index()]
    }
}

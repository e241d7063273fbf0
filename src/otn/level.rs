//! ODU 等级
//!
//! 定义 ODU0..ODU4 五个等级及其标称带宽，以及由客户带宽选择最小等级的规则。

use serde::{Deserialize, Serialize};

use crate::error::OtnError;

/// 带宽比较容差（Gbps）
pub const BANDWIDTH_TOLERANCE_GBPS: f64 = 0.001;

/// ODU 等级，按容量从小到大排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OtnLevel {
    #[serde(rename = "ODU0")]
    Odu0,
    #[serde(rename = "ODU1")]
    Odu1,
    #[serde(rename = "ODU2")]
    Odu2,
    #[serde(rename = "ODU3")]
    Odu3,
    #[serde(rename = "ODU4")]
    Odu4,
}

impl OtnLevel {
    pub const ALL: [OtnLevel; 5] = [
        OtnLevel::Odu0,
        OtnLevel::Odu1,
        OtnLevel::Odu2,
        OtnLevel::Odu3,
        OtnLevel::Odu4,
    ];

    /// 标称带宽（Gbps）
    pub fn expected_bandwidth_gbps(self) -> f64 {
        match self {
            OtnLevel::Odu0 => 1.24416,
            OtnLevel::Odu1 => 2.498775,
            OtnLevel::Odu2 => 10.037274,
            OtnLevel::Odu3 => 40.319219,
            OtnLevel::Odu4 => 104.794446,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// 按偏移量移动等级，超出范围时钳位到 ODU0/ODU4。
    pub fn offset(self, by: isize) -> OtnLevel {
        let idx = (self.index() as isize).saturating_add(by).clamp(0, 4);
        OtnLevel::ALL[idx as usize]
    }

    /// 下一个更高等级；ODU4 返回自身。
    pub fn next(self) -> OtnLevel {
        self.offset(1)
    }

    /// 带宽是否与该等级的标称带宽一致（在容差内）
    pub fn matches_bandwidth(self, bandwidth_gbps: f64) -> bool {
        (bandwidth_gbps - self.expected_bandwidth_gbps()).abs() <= BANDWIDTH_TOLERANCE_GBPS
    }

    /// 能承载给定带宽的最小等级
    pub fn for_bandwidth(bandwidth_gbps: f64) -> Result<OtnLevel, OtnError> {
        if !bandwidth_gbps.is_finite() || bandwidth_gbps < 0.0 {
            return Err(OtnError::LevelMismatch {
                bandwidth_gbps,
                level: None,
            });
        }
        OtnLevel::ALL
            .into_iter()
            .find(|l| l.expected_bandwidth_gbps() - bandwidth_gbps >= -BANDWIDTH_TOLERANCE_GBPS)
            .ok_or(OtnError::LevelMismatch {
                bandwidth_gbps,
                level: None,
            })
    }
}

impl std::fmt::Display for OtnLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ODU{}", self.index())
    }
}

use serde::{Deserialize, Serialize};

use super::series::XValue;

/// Which of the two highlighted categories is on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaSign {
    /// baseline ≥ other
    Surplus,
    /// baseline < other
    Deficit,
}

impl AreaSign {
    pub fn of(baseline: f64, other: f64) -> Self {
        if baseline >= other {
            AreaSign::Surplus
        } else {
            AreaSign::Deficit
        }
    }
}

impl std::fmt::Display for AreaSign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AreaSign::Surplus => write!(f, "Surplus"),
            AreaSign::Deficit => write!(f, "Deficit"),
        }
    }
}

/// One vertical slice of a filled region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaBound {
    pub x: XValue,
    pub lower: f64,
    pub upper: f64,
    /// True for interpolated points where the two series are equal
    pub crossover: bool,
}

/// A contiguous same-sign run between two highlighted categories.
///
/// Adjacent segments share their crossover bound, so the filled regions
/// tile without gaps or overlaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSegment {
    pub group_id: usize,
    pub sign: AreaSign,
    pub bounds: Vec<AreaBound>,
}

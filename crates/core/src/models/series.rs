use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Which part of a chart a point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Observed historical data
    Actual,
    /// Model-predicted future data
    Forecast,
    /// Synthetic bridge from the last Actual to the first Forecast point
    Connector,
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentKind::Actual => write!(f, "Actual"),
            SegmentKind::Forecast => write!(f, "Forecast"),
            SegmentKind::Connector => write!(f, "Connector"),
        }
    }
}

/// A normalised x-axis value.
///
/// Every x column is brought into exactly one of these representations
/// before any processing: temporal, quantitative or nominal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum XValue {
    Time(NaiveDateTime),
    Number(f64),
    Label(String),
}

impl XValue {
    /// Position on a linear axis, for interpolation.
    /// Time maps to epoch microseconds; labels have no linear position.
    pub fn to_linear(&self) -> Option<f64> {
        match self {
            XValue::Time(t) => Some(t.and_utc().timestamp_micros() as f64),
            XValue::Number(n) => Some(*n),
            XValue::Label(_) => None,
        }
    }

    /// Inverse of [`XValue::to_linear`], producing a value of the same kind as `self`.
    pub fn from_linear_like(&self, position: f64) -> Option<XValue> {
        match self {
            XValue::Time(_) => DateTime::from_timestamp_micros(position.round() as i64)
                .map(|dt| XValue::Time(dt.naive_utc())),
            XValue::Number(_) => Some(XValue::Number(position)),
            XValue::Label(_) => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveDateTime> {
        match self {
            XValue::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Total ordering used for sorting along the axis.
    /// Values of different kinds never share an axis; they order by kind.
    pub fn axis_cmp(&self, other: &XValue) -> Ordering {
        match (self, other) {
            (XValue::Time(a), XValue::Time(b)) => a.cmp(b),
            (XValue::Number(a), XValue::Number(b)) => a.total_cmp(b),
            (XValue::Label(a), XValue::Label(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            XValue::Time(_) => 0,
            XValue::Number(_) => 1,
            XValue::Label(_) => 2,
        }
    }
}

/// One row of a chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: XValue,
    pub y: f64,
    /// Category label, when the chart is partitioned by a category field
    pub category: Option<String>,
    pub kind: SegmentKind,
}

impl SeriesPoint {
    pub fn actual(x: XValue, y: f64, category: Option<String>) -> Self {
        Self {
            x,
            y,
            category,
            kind: SegmentKind::Actual,
        }
    }

    /// Copy of this point re-tagged with another segment kind.
    pub fn retagged(&self, kind: SegmentKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }
}

/// A (timestamp, value) pair: forecast history in, forecast predictions out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl TimePoint {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }
}

use serde::{Deserialize, Serialize};

use super::area::AreaSegment;
use super::cadence::Cadence;
use super::config::{ChartKind, Orientation, ReferenceLine};
use super::series::{SegmentKind, SeriesPoint, XValue};
use crate::errors::CoreError;

/// One endpoint of a fitted trendline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub x: XValue,
    pub y: f64,
    pub category: Option<String>,
}

/// Everything the renderer needs for one chart.
///
/// The core computes all the numbers; the frontend only draws them.
/// `points` holds Actual, then Forecast, then Connector rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub kind: ChartKind,
    pub title: String,
    pub description: Option<String>,

    pub x_field: String,
    pub x_label: String,
    pub y_field: String,
    pub y_label: String,
    pub category_field: Option<String>,
    pub category_label: Option<String>,

    pub orientation: Orientation,
    pub stacked: bool,

    /// Cadence of the forecast axis, when a single series was forecast
    pub cadence: Option<Cadence>,

    pub points: Vec<SeriesPoint>,

    /// Surplus/Deficit regions between the highlighted categories
    pub area: Vec<AreaSegment>,

    /// Trendline endpoints, two per fitted series
    pub trendline: Vec<TrendPoint>,

    pub reference_line: Option<ReferenceLine>,
}

impl ChartData {
    /// Number of points tagged with `kind`.
    pub fn count(&self, kind: SegmentKind) -> usize {
        self.points.iter().filter(|p| p.kind == kind).count()
    }

    pub fn points_of(&self, kind: SegmentKind) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter().filter(move |p| p.kind == kind)
    }

    pub fn has_forecast(&self) -> bool {
        self.count(SegmentKind::Forecast) > 0
    }

    /// Serialize for the rendering collaborator.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize chart data: {e}")))
    }
}

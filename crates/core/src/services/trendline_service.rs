use std::collections::BTreeMap;

use crate::models::chart::TrendPoint;
use crate::models::series::{SegmentKind, SeriesPoint};

/// Ordinary least squares of `values` against their index 0..n.
///
/// Returns `(slope, intercept)`, or `None` with fewer than two values.
pub fn least_squares(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n_f;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }

    let slope = sxy / sxx;
    Some((slope, y_mean - slope * x_mean))
}

/// Fits straight trendlines over chart series.
///
/// Regression is against row order, not the raw x value: on irregular time
/// axes every observation weighs the same regardless of elapsed time.
pub struct TrendlineService;

impl TrendlineService {
    pub fn new() -> Self {
        Self
    }

    /// Fit one series and return its two endpoints (first and last x).
    /// Fewer than two points yields no trendline.
    pub fn fit_trendline(&self, series: &[SeriesPoint]) -> Vec<TrendPoint> {
        let mut sorted: Vec<&SeriesPoint> = series.iter().collect();
        sorted.sort_by(|a, b| a.x.axis_cmp(&b.x));

        let values: Vec<f64> = sorted.iter().map(|p| p.y).collect();
        let Some((slope, intercept)) = least_squares(&values) else {
            return Vec::new();
        };

        let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
            return Vec::new();
        };
        let category = first.category.clone();

        vec![
            TrendPoint {
                x: first.x.clone(),
                y: intercept,
                category: category.clone(),
            },
            TrendPoint {
                x: last.x.clone(),
                y: intercept + slope * (values.len() - 1) as f64,
                category,
            },
        ]
    }

    /// Trendlines over the Actual rows: one overall, or one per category
    /// (sorted) when `by_category` is set.
    pub fn fit_trendlines(&self, points: &[SeriesPoint], by_category: bool) -> Vec<TrendPoint> {
        let actual: Vec<SeriesPoint> = points
            .iter()
            .filter(|p| p.kind == SegmentKind::Actual)
            .cloned()
            .collect();

        if !by_category {
            return self.fit_trendline(&actual);
        }

        let mut groups: BTreeMap<&str, Vec<SeriesPoint>> = BTreeMap::new();
        for point in &actual {
            if let Some(category) = point.category.as_deref() {
                groups.entry(category).or_default().push(point.clone());
            }
        }

        groups
            .values()
            .flat_map(|group| self.fit_trendline(group))
            .collect()
    }
}

impl Default for TrendlineService {
    fn default() -> Self {
        Self::new()
    }
}

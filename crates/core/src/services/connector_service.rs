use std::collections::BTreeMap;

use crate::models::series::{SegmentKind, SeriesPoint};

/// Builds the two-point bridges between observed and forecast data.
///
/// Values are copied verbatim from the bridged points; the renderer draws
/// the dashed line between them.
pub struct ConnectorService;

impl ConnectorService {
    pub fn new() -> Self {
        Self
    }

    /// Connector points linking the last Actual to the first Forecast point.
    ///
    /// Without `by_category`: exactly two points (or none when there is no
    /// forecast). With it: two points per category, in sorted category
    /// order, for every category that has both sides.
    pub fn build_connectors(
        &self,
        actual: &[SeriesPoint],
        forecast: &[SeriesPoint],
        by_category: bool,
    ) -> Vec<SeriesPoint> {
        if forecast.is_empty() {
            return Vec::new();
        }

        if !by_category {
            return bridge(actual.iter(), forecast.iter());
        }

        let mut sides: BTreeMap<&str, (Vec<&SeriesPoint>, Vec<&SeriesPoint>)> = BTreeMap::new();
        for point in actual {
            if let Some(category) = point.category.as_deref() {
                sides.entry(category).or_default().0.push(point);
            }
        }
        for point in forecast {
            if let Some(category) = point.category.as_deref() {
                sides.entry(category).or_default().1.push(point);
            }
        }

        sides
            .into_values()
            .flat_map(|(a, f)| bridge(a.into_iter(), f.into_iter()))
            .collect()
    }
}

impl Default for ConnectorService {
    fn default() -> Self {
        Self::new()
    }
}

/// Last (chronologically) of `actual` and first of `forecast`, re-tagged.
/// Ties keep the later row for the last point and the earlier for the first.
fn bridge<'a>(
    actual: impl Iterator<Item = &'a SeriesPoint>,
    forecast: impl Iterator<Item = &'a SeriesPoint>,
) -> Vec<SeriesPoint> {
    let last_actual = actual.fold(None::<&SeriesPoint>, |best, p| match best {
        Some(b) if p.x.axis_cmp(&b.x).is_lt() => Some(b),
        _ => Some(p),
    });
    let first_forecast = forecast.fold(None::<&SeriesPoint>, |best, p| match best {
        Some(b) if p.x.axis_cmp(&b.x).is_ge() => Some(b),
        _ => Some(p),
    });

    match (last_actual, first_forecast) {
        (Some(a), Some(f)) => vec![
            a.retagged(SegmentKind::Connector),
            f.retagged(SegmentKind::Connector),
        ],
        _ => Vec::new(),
    }
}

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::area::{AreaBound, AreaSegment, AreaSign};
use crate::models::series::{SegmentKind, SeriesPoint, XValue};

/// Position on the linear axis, totally ordered for use as a map key.
#[derive(Debug, Clone, Copy)]
struct AxisKey(f64);

impl PartialEq for AxisKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AxisKey {}

impl PartialOrd for AxisKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AxisKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Both highlighted series at one x, plus the side that is on top.
#[derive(Debug, Clone)]
struct AlignedRow {
    position: f64,
    x: XValue,
    baseline: f64,
    other: f64,
    sign: AreaSign,
    crossover: bool,
}

/// Builds Surplus/Deficit regions between two categories.
///
/// The two series are aligned on shared x values, and wherever they cross
/// between two rows a pair of coincident points is interpolated at the
/// crossing: one closes the region on the left, the other opens the region
/// on the right. Neighbouring regions therefore share exactly one bound.
pub struct DiffAreaService;

impl DiffAreaService {
    pub fn new() -> Self {
        Self
    }

    /// Area segments between `baseline` and `other`, in x order.
    ///
    /// Yields nothing when the categories never share an x value or when the
    /// axis is nominal (no linear domain to interpolate in).
    pub fn build_diff_area(
        &self,
        points: &[SeriesPoint],
        baseline: &str,
        other: &str,
        actual_only: bool,
    ) -> Vec<AreaSegment> {
        let rows = align(points, baseline, other, actual_only);
        if rows.is_empty() {
            tracing::debug!(baseline, other, "No overlapping rows to shade");
            return Vec::new();
        }

        let mut rows = insert_crossovers(rows);
        // Stable: coincident crossover rows keep their close-then-open order.
        rows.sort_by(|a, b| a.position.total_cmp(&b.position));

        group_runs(rows)
    }
}

impl Default for DiffAreaService {
    fn default() -> Self {
        Self::new()
    }
}

/// Inner join of the two categories on x. A later duplicate x within one
/// category replaces the earlier value.
fn align(points: &[SeriesPoint], baseline: &str, other: &str, actual_only: bool) -> Vec<AlignedRow> {
    let mut pivot: BTreeMap<AxisKey, (XValue, Option<f64>, Option<f64>)> = BTreeMap::new();

    for point in points {
        if actual_only && point.kind != SegmentKind::Actual {
            continue;
        }
        let is_baseline = match point.category.as_deref() {
            Some(c) if c == baseline => true,
            Some(c) if c == other => false,
            _ => continue,
        };
        let Some(position) = point.x.to_linear() else {
            return Vec::new();
        };

        let slot = pivot
            .entry(AxisKey(position))
            .or_insert_with(|| (point.x.clone(), None, None));
        if is_baseline {
            slot.1 = Some(point.y);
        } else {
            slot.2 = Some(point.y);
        }
    }

    pivot
        .into_iter()
        .filter_map(|(key, (x, b, o))| {
            let (baseline, other) = (b?, o?);
            Some(AlignedRow {
                position: key.0,
                x,
                baseline,
                other,
                sign: AreaSign::of(baseline, other),
                crossover: false,
            })
        })
        .collect()
}

/// Insert a close/open pair after every row whose successor has the other sign.
fn insert_crossovers(rows: Vec<AlignedRow>) -> Vec<AlignedRow> {
    let mut out = Vec::with_capacity(rows.len() + 2);
    for (i, row) in rows.iter().enumerate() {
        out.push(row.clone());
        if let Some(next) = rows.get(i + 1) {
            if let Some((close, open)) = crossover(row, next) {
                out.push(close);
                out.push(open);
            }
        }
    }
    out
}

/// Interpolated crossing between two consecutive rows of different sign.
///
/// Solves `b0 + f·Δb = o0 + f·Δo` for `f`. Parallel segments (zero
/// denominator) and solutions outside the open interval (0, 1) mean the
/// lines do not cross strictly inside the interval; no point is added.
fn crossover(a: &AlignedRow, b: &AlignedRow) -> Option<(AlignedRow, AlignedRow)> {
    if a.sign == b.sign {
        return None;
    }

    let delta_baseline = b.baseline - a.baseline;
    let delta_other = b.other - a.other;
    let denominator = delta_baseline - delta_other;
    if denominator == 0.0 {
        tracing::debug!(position = a.position, "Parallel segment, no crossover");
        return None;
    }

    let f = (a.other - a.baseline) / denominator;
    if !(f > 0.0 && f < 1.0) {
        tracing::debug!(position = a.position, fraction = f, "Crossover outside interval");
        return None;
    }

    let position = a.position + f * (b.position - a.position);
    let value = a.baseline + f * delta_baseline;
    let x = a.x.from_linear_like(position)?;

    let close = AlignedRow {
        position,
        x,
        baseline: value,
        other: value,
        sign: a.sign,
        crossover: true,
    };
    let open = AlignedRow {
        sign: b.sign,
        ..close.clone()
    };
    Some((close, open))
}

/// Split sorted rows into maximal same-sign runs.
fn group_runs(rows: Vec<AlignedRow>) -> Vec<AreaSegment> {
    let mut segments: Vec<AreaSegment> = Vec::new();

    for row in rows {
        let bound = AreaBound {
            x: row.x,
            lower: row.baseline.min(row.other),
            upper: row.baseline.max(row.other),
            crossover: row.crossover,
        };
        if let Some(segment) = segments.last_mut().filter(|s| s.sign == row.sign) {
            segment.bounds.push(bound);
            continue;
        }
        let group_id = segments.len();
        segments.push(AreaSegment {
            group_id,
            sign: row.sign,
            bounds: vec![bound],
        });
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(position: f64, baseline: f64, other: f64) -> AlignedRow {
        AlignedRow {
            position,
            x: XValue::Number(position),
            baseline,
            other,
            sign: AreaSign::of(baseline, other),
            crossover: false,
        }
    }

    #[test]
    fn crossover_lands_where_lines_meet() {
        // baseline 0 -> 2, other 2 -> 0: they meet at x = 0.5, value 1
        let (close, open) = crossover(&row(0.0, 0.0, 2.0), &row(1.0, 2.0, 0.0)).unwrap();
        assert!((close.position - 0.5).abs() < 1e-12);
        assert!((close.baseline - 1.0).abs() < 1e-12);
        assert_eq!(close.sign, AreaSign::Deficit);
        assert_eq!(open.sign, AreaSign::Surplus);
        assert_eq!(close.position, open.position);
    }

    #[test]
    fn touching_at_left_row_is_not_a_crossing() {
        // Equal at the left row (f = 0): the left row already sits on the boundary.
        assert!(crossover(&row(0.0, 1.0, 1.0), &row(1.0, 0.0, 2.0)).is_none());
    }

    #[test]
    fn same_sign_rows_have_no_crossover() {
        assert!(crossover(&row(0.0, 3.0, 1.0), &row(1.0, 4.0, 1.0)).is_none());
    }
}

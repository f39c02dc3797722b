use std::collections::HashMap;

use chrono::{Datelike, NaiveDateTime};

use crate::models::cadence::{is_month_end, Cadence, MonthAnchor};

/// Share of deltas the modal step must cover to count as a regular cadence.
const MIN_REGULARITY_SHARE: f64 = 0.75;

/// Minimum points for the statistical pass (two deltas).
const MIN_REGULARITY_POINTS: usize = 3;

/// A single gap between consecutive timestamps, in calendar terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Step {
    Months(u32),
    Days(u32),
    Irregular,
}

/// Infers the sampling cadence of a timestamp column.
///
/// Pure computation; results feed forecasting, where the cadence decides
/// the timestamps of future periods.
pub struct FrequencyService;

impl FrequencyService {
    pub fn new() -> Self {
        Self
    }

    /// Infer the cadence of `timestamps` (any order; sorted internally).
    ///
    /// 1. Regularity detection over all deltas: the modal calendar step wins
    ///    if it, together with its whole multiples, covers at least 75% of
    ///    them, so missing periods do not break a regular series.
    /// 2. Otherwise, the gap between the first two timestamps decides:
    ///    80–100 days quarterly, 28–31 monthly, n ≥ 1 days every n days.
    /// 3. Anything else (fewer than two points, zero or sub-day gaps) is daily.
    pub fn infer_frequency(&self, timestamps: &[NaiveDateTime]) -> Cadence {
        let mut sorted = timestamps.to_vec();
        sorted.sort();

        if sorted.len() < 2 {
            return Cadence::Daily;
        }

        if let Some(cadence) = self.detect_regular(&sorted) {
            tracing::debug!(%cadence, points = sorted.len(), "Inferred regular cadence");
            return cadence;
        }

        let cadence = self.from_first_gap(&sorted);
        tracing::debug!(%cadence, points = sorted.len(), "Inferred cadence from first gap");
        cadence
    }

    fn detect_regular(&self, sorted: &[NaiveDateTime]) -> Option<Cadence> {
        if sorted.len() < MIN_REGULARITY_POINTS {
            return None;
        }

        let steps: Vec<Step> = sorted.windows(2).map(|w| classify_step(w[0], w[1])).collect();

        let mut counts: HashMap<Step, usize> = HashMap::new();
        for step in &steps {
            *counts.entry(*step).or_insert(0) += 1;
        }

        // Ties resolve towards the smaller step for determinism.
        let (mode, count) = counts
            .into_iter()
            .filter(|(step, _)| *step != Step::Irregular)
            .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| step_rank(b).cmp(&step_rank(a))))?;

        // Whole multiples of a repeated mode are missing periods, not noise.
        let covered = if count > 1 {
            steps.iter().filter(|s| is_multiple_of(**s, mode)).count()
        } else {
            count
        };
        if (covered as f64) / (steps.len() as f64) < MIN_REGULARITY_SHARE {
            return None;
        }

        match mode {
            Step::Months(m) => Cadence::from_months(m, anchor_of(sorted)),
            Step::Days(d) => Some(Cadence::from_days(d)),
            Step::Irregular => None,
        }
    }

    fn from_first_gap(&self, sorted: &[NaiveDateTime]) -> Cadence {
        let days = (sorted[1] - sorted[0]).num_days();
        match days {
            80..=100 => Cadence::Quarterly(anchor_of(sorted)),
            28..=31 => Cadence::Monthly(anchor_of(sorted)),
            d if d >= 1 => Cadence::from_days(u32::try_from(d).unwrap_or(u32::MAX)),
            _ => Cadence::Daily,
        }
    }
}

impl Default for FrequencyService {
    fn default() -> Self {
        Self::new()
    }
}

fn classify_step(a: NaiveDateTime, b: NaiveDateTime) -> Step {
    let (da, db) = (a.date(), b.date());
    let same_time = a.time() == b.time();
    let month_aligned = da.day() == db.day() || (is_month_end(da) && is_month_end(db));

    if same_time && month_aligned {
        let months = month_index(b) - month_index(a);
        if months > 0 {
            return Step::Months(months as u32);
        }
    }

    let delta = b - a;
    let days = delta.num_days();
    if days >= 1 && delta == chrono::Duration::days(days) {
        return Step::Days(days as u32);
    }
    Step::Irregular
}

fn is_multiple_of(step: Step, base: Step) -> bool {
    match (step, base) {
        (Step::Months(n), Step::Months(m)) => m > 0 && n % m == 0,
        (Step::Days(n), Step::Days(d)) => d > 0 && n % d == 0,
        _ => false,
    }
}

fn month_index(t: NaiveDateTime) -> i64 {
    i64::from(t.year()) * 12 + i64::from(t.month0())
}

fn step_rank(step: &Step) -> (u8, u32) {
    match step {
        Step::Days(d) => (0, *d),
        Step::Months(m) => (1, *m),
        Step::Irregular => (2, 0),
    }
}

/// Anchor shared by every timestamp: month start, month end, or neither.
fn anchor_of(sorted: &[NaiveDateTime]) -> MonthAnchor {
    if sorted.iter().all(|t| t.day() == 1) {
        MonthAnchor::Start
    } else if sorted.iter().all(|t| is_month_end(t.date())) {
        MonthAnchor::End
    } else {
        MonthAnchor::Day
    }
}

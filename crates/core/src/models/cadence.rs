use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Where month-based periods land within the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonthAnchor {
    /// First day of the month
    Start,
    /// Last day of the month
    End,
    /// Same day-of-month as the last observation (clamped in short months)
    Day,
}

/// Sampling frequency of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cadence {
    Daily,
    /// Every `n` days (n > 1)
    EveryNDays(u32),
    Weekly,
    Monthly(MonthAnchor),
    /// Every `n` months, for steps other than 1, 3 and 12
    EveryNMonths(u32, MonthAnchor),
    Quarterly(MonthAnchor),
    Yearly(MonthAnchor),
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn suffix(anchor: &MonthAnchor) -> &'static str {
            match anchor {
                MonthAnchor::Start => "S",
                MonthAnchor::End => "E",
                MonthAnchor::Day => "",
            }
        }
        match self {
            Cadence::Daily => write!(f, "D"),
            Cadence::EveryNDays(n) => write!(f, "{n}D"),
            Cadence::Weekly => write!(f, "W"),
            Cadence::Monthly(a) => write!(f, "M{}", suffix(a)),
            Cadence::EveryNMonths(n, a) => write!(f, "{n}M{}", suffix(a)),
            Cadence::Quarterly(a) => write!(f, "Q{}", suffix(a)),
            Cadence::Yearly(a) => write!(f, "Y{}", suffix(a)),
        }
    }
}

impl Cadence {
    /// Cadence for a fixed day step; 1 collapses to `Daily`, 7 to `Weekly`.
    pub fn from_days(days: u32) -> Self {
        match days {
            0 | 1 => Cadence::Daily,
            7 => Cadence::Weekly,
            n => Cadence::EveryNDays(n),
        }
    }

    /// Cadence for a whole-month step; `None` for a zero step.
    pub fn from_months(months: u32, anchor: MonthAnchor) -> Option<Self> {
        match months {
            0 => None,
            1 => Some(Cadence::Monthly(anchor)),
            3 => Some(Cadence::Quarterly(anchor)),
            12 => Some(Cadence::Yearly(anchor)),
            n => Some(Cadence::EveryNMonths(n, anchor)),
        }
    }

    /// The timestamp `periods` steps after `base`.
    ///
    /// Month-based steps are computed from `base` directly, never by
    /// repeated addition, so day-of-month clamping cannot drift.
    pub fn advance(&self, base: NaiveDateTime, periods: u32) -> Option<NaiveDateTime> {
        match self {
            Cadence::Daily => base.checked_add_signed(Duration::days(i64::from(periods))),
            Cadence::EveryNDays(n) => {
                base.checked_add_signed(Duration::days(i64::from(*n) * i64::from(periods)))
            }
            Cadence::Weekly => base.checked_add_signed(Duration::weeks(i64::from(periods))),
            Cadence::Monthly(anchor) => add_months(base, periods, *anchor),
            Cadence::EveryNMonths(n, anchor) => add_months(base, periods.checked_mul(*n)?, *anchor),
            Cadence::Quarterly(anchor) => add_months(base, periods.checked_mul(3)?, *anchor),
            Cadence::Yearly(anchor) => add_months(base, periods.checked_mul(12)?, *anchor),
        }
    }

    /// The `n` timestamps following `last`, one period apart.
    pub fn future_timestamps(&self, last: NaiveDateTime, n: usize) -> Vec<NaiveDateTime> {
        (1..=n as u32)
            .map_while(|i| self.advance(last, i))
            .collect()
    }
}

fn add_months(base: NaiveDateTime, months: u32, anchor: MonthAnchor) -> Option<NaiveDateTime> {
    let shifted = base.checked_add_months(Months::new(months))?;
    match anchor {
        MonthAnchor::End => {
            let last = last_day_of_month(shifted.date())?;
            Some(last.and_time(base.time()))
        }
        MonthAnchor::Start => shifted.date().with_day(1).map(|d| d.and_time(base.time())),
        MonthAnchor::Day => Some(shifted),
    }
}

/// Last calendar day of `date`'s month.
pub(crate) fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    first.checked_add_months(Months::new(1))?.pred_opt()
}

pub(crate) fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().is_some_and(|next| next.month() != date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn month_end_does_not_drift_through_february() {
        let cadence = Cadence::Monthly(MonthAnchor::End);
        let future = cadence.future_timestamps(at(2024, 1, 31), 3);
        assert_eq!(future, vec![at(2024, 2, 29), at(2024, 3, 31), at(2024, 4, 30)]);
    }

    #[test]
    fn quarterly_start_steps_three_months() {
        let cadence = Cadence::Quarterly(MonthAnchor::Start);
        assert_eq!(cadence.advance(at(2024, 10, 1), 1), Some(at(2025, 1, 1)));
    }

    #[test]
    fn bimonthly_stays_on_month_starts() {
        let cadence = Cadence::EveryNMonths(2, MonthAnchor::Start);
        let future = cadence.future_timestamps(at(2023, 11, 1), 3);
        assert_eq!(future, vec![at(2024, 1, 1), at(2024, 3, 1), at(2024, 5, 1)]);
    }

    #[test]
    fn display_uses_short_tokens() {
        assert_eq!(Cadence::Daily.to_string(), "D");
        assert_eq!(Cadence::EveryNDays(14).to_string(), "14D");
        assert_eq!(Cadence::Monthly(MonthAnchor::Start).to_string(), "MS");
        assert_eq!(Cadence::EveryNMonths(2, MonthAnchor::End).to_string(), "2ME");
        assert_eq!(Cadence::Quarterly(MonthAnchor::End).to_string(), "QE");
        assert_eq!(Cadence::Yearly(MonthAnchor::Day).to_string(), "Y");
    }
}

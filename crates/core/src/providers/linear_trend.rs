use crate::errors::CoreError;
use crate::models::cadence::Cadence;
use crate::models::series::TimePoint;
use crate::services::trendline_service::least_squares;

use super::traits::{attach_timestamps, ForecastProvider};

/// Straight-line extrapolation of an index-based least-squares fit.
///
/// Needs only two observations, so it is the usual fallback when a
/// richer model refuses a short series.
pub struct LinearTrendProvider;

impl LinearTrendProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LinearTrendProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastProvider for LinearTrendProvider {
    fn name(&self) -> &str {
        "linear_trend"
    }

    fn fit_and_predict(
        &self,
        history: &[TimePoint],
        horizon: usize,
        cadence: &Cadence,
    ) -> Result<Vec<TimePoint>, CoreError> {
        let values: Vec<f64> = history.iter().map(|p| p.value).collect();
        let (slope, intercept) = least_squares(&values).ok_or_else(|| CoreError::Forecast {
            provider: self.name().to_string(),
            message: format!("Need at least 2 observations, got {}", values.len()),
        })?;

        let n = values.len();
        let predictions = (0..horizon)
            .map(|i| intercept + slope * (n + i) as f64)
            .collect();

        attach_timestamps(self.name(), history, predictions, cadence)
    }
}

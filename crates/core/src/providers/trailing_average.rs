use crate::errors::CoreError;
use crate::models::cadence::Cadence;
use crate::models::series::TimePoint;

use super::traits::{attach_timestamps, ForecastProvider};

/// Flat forecast at the mean of the last `window` observations
/// (e.g., "last 6-month average" on a monthly series).
pub struct TrailingAverageProvider {
    window: usize,
}

impl TrailingAverageProvider {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }
}

impl Default for TrailingAverageProvider {
    fn default() -> Self {
        Self::new(6)
    }
}

impl ForecastProvider for TrailingAverageProvider {
    fn name(&self) -> &str {
        "trailing_average"
    }

    fn fit_and_predict(
        &self,
        history: &[TimePoint],
        horizon: usize,
        cadence: &Cadence,
    ) -> Result<Vec<TimePoint>, CoreError> {
        if history.is_empty() {
            return Err(CoreError::Forecast {
                provider: self.name().to_string(),
                message: "History is empty".into(),
            });
        }

        let start = history.len().saturating_sub(self.window);
        let tail = &history[start..];
        let mean = tail.iter().map(|p| p.value).sum::<f64>() / tail.len() as f64;

        attach_timestamps(self.name(), history, vec![mean; horizon], cadence)
    }
}

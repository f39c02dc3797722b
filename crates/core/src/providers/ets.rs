use augurs_core::{Fit, Predict};
use augurs_ets::AutoETS;

use crate::errors::CoreError;
use crate::models::cadence::Cadence;
use crate::models::series::TimePoint;

use super::traits::{attach_timestamps, ForecastProvider};

/// Automatic exponential smoothing (non-seasonal ETS) via `augurs`.
///
/// The primary model: picks error/trend components by information
/// criterion and extrapolates the fitted level and trend.
pub struct EtsProvider {
    confidence_level: f64,
}

impl EtsProvider {
    pub fn new(confidence_level: f64) -> Self {
        Self { confidence_level }
    }
}

impl Default for EtsProvider {
    fn default() -> Self {
        Self::new(0.95)
    }
}

impl ForecastProvider for EtsProvider {
    fn name(&self) -> &str {
        "ets"
    }

    fn fit_and_predict(
        &self,
        history: &[TimePoint],
        horizon: usize,
        cadence: &Cadence,
    ) -> Result<Vec<TimePoint>, CoreError> {
        let values: Vec<f64> = history.iter().map(|p| p.value).collect();

        let model = AutoETS::non_seasonal();
        let fitted = model.fit(&values).map_err(|e| CoreError::Forecast {
            provider: self.name().to_string(),
            message: format!("ETS model fitting failed: {e}"),
        })?;
        let forecast = fitted
            .predict(horizon, self.confidence_level)
            .map_err(|e| CoreError::Forecast {
                provider: self.name().to_string(),
                message: format!("ETS prediction failed: {e}"),
            })?;

        attach_timestamps(self.name(), history, forecast.point, cadence)
    }
}

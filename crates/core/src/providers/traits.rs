use crate::errors::CoreError;
use crate::models::cadence::Cadence;
use crate::models::series::TimePoint;

/// Trait abstraction for all forecasting models.
///
/// A provider is a black box: given a chronologically sorted history and
/// the series' cadence, it returns up to `horizon` future points, one per
/// period after the last observation. Implementations must be pure (same
/// input, same output) because results are memoised by content.
pub trait ForecastProvider: Send + Sync {
    /// Short, stable name of this model (used in cache keys and logs).
    fn name(&self) -> &str;

    /// Fit the model on `history` and predict `horizon` periods ahead.
    ///
    /// May fail (too little variance, no convergence, ...) or return fewer
    /// points than requested; callers tolerate both.
    fn fit_and_predict(
        &self,
        history: &[TimePoint],
        horizon: usize,
        cadence: &Cadence,
    ) -> Result<Vec<TimePoint>, CoreError>;
}

/// Pair predicted values with the timestamps that follow the history.
pub(crate) fn attach_timestamps(
    provider: &str,
    history: &[TimePoint],
    values: Vec<f64>,
    cadence: &Cadence,
) -> Result<Vec<TimePoint>, CoreError> {
    let last = history.last().ok_or_else(|| CoreError::Forecast {
        provider: provider.to_string(),
        message: "History is empty".into(),
    })?;
    let timestamps = cadence.future_timestamps(last.timestamp, values.len());
    Ok(timestamps
        .into_iter()
        .zip(values)
        .map(|(timestamp, value)| TimePoint::new(timestamp, value))
        .collect())
}

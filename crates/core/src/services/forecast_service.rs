use std::collections::BTreeMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::models::cache::{ForecastCache, ForecastKey};
use crate::models::cadence::Cadence;
use crate::models::series::{SegmentKind, SeriesPoint, TimePoint, XValue};
use crate::models::settings::EngineSettings;
use crate::providers::registry::ForecastProviderRegistry;
use crate::services::frequency_service::FrequencyService;

/// Field names of the series being forecast; part of every cache key.
#[derive(Debug, Clone, Copy)]
pub struct SeriesFields<'a> {
    pub x_field: &'a str,
    pub y_field: &'a str,
}

/// Forecast points for a whole chart, plus the cadence used per series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastOutput {
    /// Forecast-tagged points, grouped by category in sorted order
    pub points: Vec<SeriesPoint>,
    /// Cadence per forecast series (`None` key for an uncategorised chart)
    pub cadences: BTreeMap<Option<String>, Cadence>,
}

/// Runs forecasting per series (or per category) with memoisation.
///
/// Every series is always fitted for `max_horizon` periods and cached under
/// a content-derived key; a requested horizon is only a slice of that, so
/// moving a horizon slider never refits.
pub struct ForecastService {
    registry: ForecastProviderRegistry,
    frequency_service: FrequencyService,
    max_horizon: usize,
    min_history: usize,
}

impl ForecastService {
    pub fn new(registry: ForecastProviderRegistry, settings: &EngineSettings) -> Self {
        Self {
            registry,
            frequency_service: FrequencyService::new(),
            max_horizon: settings.max_horizon,
            min_history: settings.min_history,
        }
    }

    pub fn registry(&self) -> &ForecastProviderRegistry {
        &self.registry
    }

    pub fn max_horizon(&self) -> usize {
        self.max_horizon
    }

    /// Forecast `history` (Actual points on a time axis).
    ///
    /// Without `by_category` the whole history is one series. With it, each
    /// category is forecast independently with its own cadence; categories
    /// below `min_history` observations, or whose providers all fail, get no
    /// forecast while the others proceed.
    pub fn create_forecast(
        &self,
        cache: &ForecastCache,
        history: &[SeriesPoint],
        fields: SeriesFields<'_>,
        by_category: bool,
        requested_horizon: usize,
    ) -> ForecastOutput {
        let mut output = ForecastOutput::default();
        let horizon = requested_horizon.min(self.max_horizon);

        let mut groups: BTreeMap<Option<&str>, Vec<TimePoint>> = BTreeMap::new();
        for point in history {
            let Some(timestamp) = point.x.as_time() else {
                continue;
            };
            let key = if by_category {
                match point.category.as_deref() {
                    Some(category) => Some(category),
                    None => continue,
                }
            } else {
                None
            };
            groups
                .entry(key)
                .or_default()
                .push(TimePoint::new(timestamp, point.y));
        }

        for (category, mut series) in groups {
            if series.len() < self.min_history {
                tracing::debug!(
                    category = category.unwrap_or("<all>"),
                    points = series.len(),
                    "Skipping forecast: not enough history"
                );
                continue;
            }
            series.sort_by_key(|p| p.timestamp);

            let Some((cadence, predictions)) = self.forecast_series(cache, &series, fields, category)
            else {
                continue;
            };

            output.cadences.insert(category.map(str::to_string), cadence);
            output.points.extend(predictions.iter().take(horizon).map(|p| SeriesPoint {
                x: XValue::Time(p.timestamp),
                y: p.value,
                category: category.map(str::to_string),
                kind: SegmentKind::Forecast,
            }));
        }

        output
    }

    /// Fit one chronologically sorted series for the full `max_horizon`,
    /// going through the cache. `None` when every provider failed.
    pub fn forecast_series(
        &self,
        cache: &ForecastCache,
        series: &[TimePoint],
        fields: SeriesFields<'_>,
        category: Option<&str>,
    ) -> Option<(Cadence, Arc<[TimePoint]>)> {
        let timestamps: Vec<_> = series.iter().map(|p| p.timestamp).collect();
        let cadence = self.frequency_service.infer_frequency(&timestamps);

        let key = ForecastKey {
            content_hash: content_hash(series, &cadence),
            x_field: fields.x_field.to_string(),
            y_field: fields.y_field.to_string(),
            category: category.map(str::to_string),
            horizon: self.max_horizon,
            model: self.registry.signature(),
        };

        if let Some(hit) = cache.get(&key) {
            tracing::debug!(category = category.unwrap_or("<all>"), "Forecast cache hit");
            return Some((cadence, hit));
        }

        tracing::debug!(
            category = category.unwrap_or("<all>"),
            points = series.len(),
            %cadence,
            "Forecast cache miss, fitting"
        );
        let predictions = self.fit_with_fallback(series, &cadence, category)?;
        Some((cadence, cache.insert(key, predictions)))
    }

    /// Try each provider in order; the first usable result wins.
    ///
    /// A result is usable when every value is finite and at least one
    /// prediction lies after the last observation. Earlier predictions are
    /// dropped, and anything beyond `max_horizon` is truncated.
    fn fit_with_fallback(
        &self,
        series: &[TimePoint],
        cadence: &Cadence,
        category: Option<&str>,
    ) -> Option<Vec<TimePoint>> {
        let last = series.last()?.timestamp;

        for provider in self.registry.providers() {
            match provider.fit_and_predict(series, self.max_horizon, cadence) {
                Ok(points) => {
                    if points.iter().any(|p| !p.value.is_finite()) {
                        tracing::warn!(
                            provider = provider.name(),
                            category = category.unwrap_or("<all>"),
                            "Forecast provider returned non-finite values"
                        );
                        continue;
                    }
                    let mut points: Vec<TimePoint> =
                        points.into_iter().filter(|p| p.timestamp > last).collect();
                    points.truncate(self.max_horizon);
                    if points.is_empty() {
                        tracing::warn!(
                            provider = provider.name(),
                            category = category.unwrap_or("<all>"),
                            "Forecast provider returned no future points"
                        );
                        continue;
                    }
                    return Some(points);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        category = category.unwrap_or("<all>"),
                        error = %e,
                        "Forecast provider failed"
                    );
                }
            }
        }

        tracing::warn!(
            category = category.unwrap_or("<all>"),
            providers = self.registry.signature(),
            "No forecast produced"
        );
        None
    }
}

/// SHA-256 over the series content and its cadence, hex encoded.
fn content_hash(series: &[TimePoint], cadence: &Cadence) -> String {
    let mut hasher = Sha256::new();
    for point in series {
        hasher.update(point.timestamp.and_utc().timestamp_micros().to_le_bytes());
        hasher.update(point.value.to_bits().to_le_bytes());
    }
    hasher.update(cadence.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Maximum number of periods a forecast is ever fitted for.
pub const DEFAULT_MAX_HORIZON: usize = 12;

/// Engine-wide settings shared by every chart render.
///
/// Every field has a default, so a partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Ceiling for requested horizons; forecasts are always fitted this far.
    pub max_horizon: usize,

    /// Minimum observations a series (or category) needs to be forecast.
    pub min_history: usize,

    /// Provider names in fallback order (e.g., "ets", "linear_trend").
    pub providers: Vec<String>,

    /// Window used by the trailing-average provider.
    pub trailing_window: usize,

    /// Prediction interval level handed to interval-capable models.
    pub confidence_level: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_horizon: DEFAULT_MAX_HORIZON,
            min_history: 2,
            providers: vec!["ets".to_string(), "linear_trend".to_string()],
            trailing_window: 6,
            confidence_level: 0.95,
        }
    }
}

impl EngineSettings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: EngineSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_horizon == 0 {
            return Err(CoreError::ValidationError(
                "max_horizon must be at least 1".into(),
            ));
        }
        if self.min_history < 2 {
            return Err(CoreError::ValidationError(format!(
                "min_history must be at least 2, got {}",
                self.min_history
            )));
        }
        if self.trailing_window == 0 {
            return Err(CoreError::ValidationError(
                "trailing_window must be at least 1".into(),
            ));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(CoreError::ValidationError(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        Ok(())
    }
}

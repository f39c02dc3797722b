use serde::{Deserialize, Serialize};

use super::settings::EngineSettings;
use super::table::CellValue;
use crate::errors::CoreError;

/// The chart families whose data this core shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// Forecast request: how many future periods to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastOptions {
    pub horizon: usize,
}

/// Two categories whose difference is shaded as Surplus/Deficit areas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightPair {
    pub baseline: String,
    pub other: String,
    /// Shade only observed rows, never forecast overlays.
    #[serde(default = "default_actual_only")]
    pub actual_only: bool,
}

fn default_actual_only() -> bool {
    true
}

/// A single reference marker drawn across the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub axis: Axis,
    pub value: CellValue,
    pub label: String,
}

/// Immutable per-render chart configuration.
///
/// Built once by the caller, validated at the boundary, then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub kind: ChartKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,

    pub x_field: String,
    #[serde(default)]
    pub x_label: Option<String>,
    pub y_field: String,
    #[serde(default)]
    pub y_label: Option<String>,

    #[serde(default)]
    pub category_field: Option<String>,
    #[serde(default)]
    pub category_label: Option<String>,

    #[serde(default)]
    pub forecast: Option<ForecastOptions>,
    #[serde(default)]
    pub highlight: Option<HighlightPair>,
    #[serde(default)]
    pub trendline: bool,
    #[serde(default)]
    pub reference_line: Option<ReferenceLine>,

    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub stacked: bool,
}

impl ChartConfig {
    pub fn new(kind: ChartKind, x_field: impl Into<String>, y_field: impl Into<String>) -> Self {
        Self {
            kind,
            title: String::new(),
            description: None,
            x_field: x_field.into(),
            x_label: None,
            y_field: y_field.into(),
            y_label: None,
            category_field: None,
            category_label: None,
            forecast: None,
            highlight: None,
            trendline: false,
            reference_line: None,
            orientation: Orientation::Vertical,
            stacked: false,
        }
    }

    pub fn line(x_field: impl Into<String>, y_field: impl Into<String>) -> Self {
        Self::new(ChartKind::Line, x_field, y_field)
    }

    pub fn bar(x_field: impl Into<String>, y_field: impl Into<String>) -> Self {
        Self::new(ChartKind::Bar, x_field, y_field)
    }

    pub fn area(x_field: impl Into<String>, y_field: impl Into<String>) -> Self {
        Self::new(ChartKind::Area, x_field, y_field)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = Some(x_label.into());
        self.y_label = Some(y_label.into());
        self
    }

    pub fn with_category(mut self, field: impl Into<String>) -> Self {
        self.category_field = Some(field.into());
        self
    }

    pub fn with_forecast(mut self, horizon: usize) -> Self {
        self.forecast = Some(ForecastOptions { horizon });
        self
    }

    pub fn with_highlight(mut self, baseline: impl Into<String>, other: impl Into<String>) -> Self {
        self.highlight = Some(HighlightPair {
            baseline: baseline.into(),
            other: other.into(),
            actual_only: true,
        });
        self
    }

    pub fn with_trendline(mut self) -> Self {
        self.trendline = true;
        self
    }

    pub fn with_reference_line(
        mut self,
        axis: Axis,
        value: impl Into<CellValue>,
        label: impl Into<String>,
    ) -> Self {
        self.reference_line = Some(ReferenceLine {
            axis,
            value: value.into(),
            label: label.into(),
        });
        self
    }

    pub fn horizontal(mut self) -> Self {
        self.orientation = Orientation::Horizontal;
        self
    }

    pub fn stacked(mut self) -> Self {
        self.stacked = true;
        self
    }

    /// Parse a configuration from JSON (field names as in this struct).
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn x_label(&self) -> &str {
        self.x_label.as_deref().unwrap_or(&self.x_field)
    }

    pub fn y_label(&self) -> &str {
        self.y_label.as_deref().unwrap_or(&self.y_field)
    }

    pub fn category_label(&self) -> Option<&str> {
        self.category_label
            .as_deref()
            .or(self.category_field.as_deref())
    }

    /// Check the configuration once, before any data is touched.
    pub fn validate(&self, settings: &EngineSettings) -> Result<(), CoreError> {
        if self.x_field.trim().is_empty() || self.y_field.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "x_field and y_field must not be empty".into(),
            ));
        }
        if self.category_field.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(CoreError::ValidationError(
                "category_field must not be empty when set".into(),
            ));
        }

        if let Some(forecast) = &self.forecast {
            if forecast.horizon == 0 || forecast.horizon > settings.max_horizon {
                return Err(CoreError::ValidationError(format!(
                    "Forecast horizon {} outside 1..={}",
                    forecast.horizon, settings.max_horizon
                )));
            }
        }

        if let Some(pair) = &self.highlight {
            if self.category_field.is_none() {
                return Err(CoreError::ValidationError(
                    "Area highlight requires a category_field".into(),
                ));
            }
            if pair.baseline == pair.other {
                return Err(CoreError::ValidationError(format!(
                    "Area highlight needs two distinct categories, got '{}' twice",
                    pair.baseline
                )));
            }
        }

        Ok(())
    }
}

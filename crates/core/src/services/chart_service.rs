use chrono::{NaiveDate, NaiveDateTime};

use crate::errors::CoreError;
use crate::models::cache::ForecastCache;
use crate::models::chart::ChartData;
use crate::models::config::ChartConfig;
use crate::models::series::{SeriesPoint, XValue};
use crate::models::settings::EngineSettings;
use crate::models::table::{CellValue, Column, Table};
use crate::providers::registry::ForecastProviderRegistry;
use crate::services::connector_service::ConnectorService;
use crate::services::diff_area_service::DiffAreaService;
use crate::services::forecast_service::{ForecastOutput, ForecastService, SeriesFields};
use crate::services::trendline_service::TrendlineService;

/// Datetime layouts accepted for textual x values.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Date-only layouts accepted for textual x values.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Generates chart-ready data sets from a table and a chart configuration.
///
/// The core computes all the numbers; the frontend only renders.
/// Per render, in order:
/// 1. Normalise the x column (temporal, numeric or nominal) into Actual points
/// 2. Forecast (per category if configured) and bridge it with connectors
/// 3. Shade the difference between a highlighted category pair
/// 4. Fit trendlines
/// 5. Combine everything into one `ChartData`
pub struct ChartService {
    settings: EngineSettings,
    forecast_service: ForecastService,
    connector_service: ConnectorService,
    diff_area_service: DiffAreaService,
    trendline_service: TrendlineService,
}

impl ChartService {
    pub fn new(registry: ForecastProviderRegistry, settings: EngineSettings) -> Self {
        Self {
            forecast_service: ForecastService::new(registry, &settings),
            settings,
            connector_service: ConnectorService::new(),
            diff_area_service: DiffAreaService::new(),
            trendline_service: TrendlineService::new(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn forecast_service(&self) -> &ForecastService {
        &self.forecast_service
    }

    /// Build the full chart data set.
    ///
    /// `requested_horizon` overrides the configured forecast horizon (the
    /// interactive slider); it is ignored when forecasting is off.
    pub fn assemble(
        &self,
        table: &Table,
        config: &ChartConfig,
        cache: &ForecastCache,
        requested_horizon: Option<usize>,
    ) -> Result<ChartData, CoreError> {
        config.validate(&self.settings)?;

        let by_category = config.category_field.is_some();
        let actual = self.extract_actual(table, config)?;

        let forecast = match &config.forecast {
            Some(options) => {
                let horizon = requested_horizon.unwrap_or(options.horizon);
                self.forecast(cache, &actual, config, horizon)?
            }
            None => ForecastOutput::default(),
        };

        let connectors =
            self.connector_service
                .build_connectors(&actual, &forecast.points, by_category);

        let area = match &config.highlight {
            Some(pair) => {
                let shaded: Vec<SeriesPoint> = actual
                    .iter()
                    .chain(forecast.points.iter())
                    .cloned()
                    .collect();
                self.diff_area_service.build_diff_area(
                    &shaded,
                    &pair.baseline,
                    &pair.other,
                    pair.actual_only,
                )
            }
            None => Vec::new(),
        };

        let trendline = if config.trendline {
            self.trendline_service.fit_trendlines(&actual, by_category)
        } else {
            Vec::new()
        };

        let cadence = if by_category {
            None
        } else {
            forecast.cadences.get(&None).copied()
        };

        let mut points = actual;
        points.extend(forecast.points);
        points.extend(connectors);

        Ok(ChartData {
            kind: config.kind,
            title: config.title.clone(),
            description: config.description.clone(),
            x_field: config.x_field.clone(),
            x_label: config.x_label().to_string(),
            y_field: config.y_field.clone(),
            y_label: config.y_label().to_string(),
            category_field: config.category_field.clone(),
            category_label: config.category_label().map(str::to_string),
            orientation: config.orientation,
            stacked: config.stacked,
            cadence,
            points,
            area,
            trendline,
            reference_line: config.reference_line.clone(),
        })
    }

    /// Turn the configured columns into Actual points, in table order.
    ///
    /// Rows with a null x, y or category are skipped. A non-numeric y, or an
    /// x column mixing kinds, is a `TypeMismatch`.
    pub fn extract_actual(
        &self,
        table: &Table,
        config: &ChartConfig,
    ) -> Result<Vec<SeriesPoint>, CoreError> {
        let xs = normalize_x(table.column(&config.x_field)?)?;
        let ys = table.column(&config.y_field)?;
        let categories = match &config.category_field {
            Some(field) => Some(table.column(field)?),
            None => None,
        };

        let mut points = Vec::with_capacity(xs.len());
        let mut skipped = 0usize;

        for (row, x) in xs.into_iter().enumerate() {
            let y = match &ys.values[row] {
                CellValue::Number(n) if n.is_finite() => Some(*n),
                cell if cell.is_null() => None,
                other => {
                    return Err(CoreError::TypeMismatch {
                        field: ys.name.clone(),
                        message: format!("row {row}: expected a number, got {other:?}"),
                    })
                }
            };
            let category = match categories {
                Some(column) => match category_label(&column.values[row]) {
                    Some(label) => Some(label),
                    None => {
                        skipped += 1;
                        continue;
                    }
                },
                None => None,
            };

            match (x, y) {
                (Some(x), Some(y)) => points.push(SeriesPoint::actual(x, y, category)),
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(skipped, kept = points.len(), "Dropped rows with missing values");
        }
        Ok(points)
    }

    fn forecast(
        &self,
        cache: &ForecastCache,
        actual: &[SeriesPoint],
        config: &ChartConfig,
        horizon: usize,
    ) -> Result<ForecastOutput, CoreError> {
        if horizon > self.settings.max_horizon {
            return Err(CoreError::ValidationError(format!(
                "Requested horizon {horizon} exceeds maximum of {}",
                self.settings.max_horizon
            )));
        }
        if actual.iter().any(|p| p.x.as_time().is_none()) {
            return Err(CoreError::ValidationError(format!(
                "Forecasting requires a temporal x-axis, '{}' is not one",
                config.x_field
            )));
        }
        if self.forecast_service.registry().is_empty() {
            return Err(CoreError::NoProvider(format!(
                "chart on '{}' requests a forecast but no provider is registered",
                config.y_field
            )));
        }
        if actual.len() < 2 {
            return Ok(ForecastOutput::default());
        }

        let fields = SeriesFields {
            x_field: &config.x_field,
            y_field: &config.y_field,
        };
        Ok(self.forecast_service.create_forecast(
            cache,
            actual,
            fields,
            config.category_field.is_some(),
            horizon,
        ))
    }
}

/// Bring an x column into a single representation.
///
/// Timestamps and date-like strings form a temporal axis, numbers a
/// numeric one, and any other strings a nominal one. Nulls stay `None`.
fn normalize_x(column: &Column) -> Result<Vec<Option<XValue>>, CoreError> {
    let present = || column.values.iter().filter(|c| !c.is_null());

    let all_temporal = present().all(|c| match c {
        CellValue::Timestamp(_) => true,
        CellValue::Text(s) => parse_datetime(s).is_some(),
        _ => false,
    });
    let all_numeric = present().all(|c| matches!(c, CellValue::Number(_)));
    let all_text = present().all(|c| matches!(c, CellValue::Text(_)));

    let convert = |cell: &CellValue| -> Option<XValue> {
        if cell.is_null() {
            return None;
        }
        match cell {
            CellValue::Timestamp(t) if all_temporal => Some(XValue::Time(*t)),
            CellValue::Text(s) if all_temporal => parse_datetime(s).map(XValue::Time),
            CellValue::Number(n) if all_numeric => Some(XValue::Number(*n)),
            CellValue::Text(s) if all_text => Some(XValue::Label(s.clone())),
            _ => None,
        }
    };

    if !(all_temporal || all_numeric || all_text) {
        return Err(CoreError::TypeMismatch {
            field: column.name.clone(),
            message: "x values mix dates, numbers and text".into(),
        });
    }

    Ok(column.values.iter().map(convert).collect())
}

/// Parse a date or datetime string; a bare `YYYY-MM` means the first of the month.
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .or_else(|| {
            NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}

fn category_label(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Null => None,
        CellValue::Text(s) => Some(s.clone()),
        CellValue::Number(n) if n.is_nan() => None,
        CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
        CellValue::Number(n) => Some(n.to_string()),
        CellValue::Timestamp(t) => Some(t.to_string()),
    }
}

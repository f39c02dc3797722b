// ═══════════════════════════════════════════════════════════════════
// Integration Tests — Dashboard facade, end-to-end chart rendering
// ═══════════════════════════════════════════════════════════════════

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Months, NaiveDate, NaiveDateTime};

use chartcast_core::errors::CoreError;
use chartcast_core::models::area::AreaSign;
use chartcast_core::models::cache::ForecastCache;
use chartcast_core::models::cadence::{Cadence, MonthAnchor};
use chartcast_core::models::config::{Axis, ChartConfig};
use chartcast_core::models::series::{SegmentKind, TimePoint, XValue};
use chartcast_core::models::settings::EngineSettings;
use chartcast_core::models::table::Table;
use chartcast_core::providers::linear_trend::LinearTrendProvider;
use chartcast_core::providers::registry::ForecastProviderRegistry;
use chartcast_core::providers::traits::ForecastProvider;
use chartcast_core::Dashboard;

// ═══════════════════════════════════════════════════════════════════
// Helpers & Mock Providers
// ═══════════════════════════════════════════════════════════════════

fn month(i: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Months::new(i)
}

/// 24 monthly sales figures on a straight line: 100, 105, ..., 215.
fn make_monthly_table() -> Table {
    Table::new()
        .with_column("month", (0..24).map(month).collect::<Vec<_>>())
        .unwrap()
        .with_column("sales", (0..24).map(|i| 100.0 + 5.0 * i as f64).collect::<Vec<_>>())
        .unwrap()
}

/// North rises 100 → 210 over 12 months; South holds at 165.
/// North overtakes South between month 6 (160) and month 7 (170).
fn make_regional_table() -> Table {
    make_regional_table_with(&[])
}

fn make_regional_table_with(extra: &[(u32, &str, f64)]) -> Table {
    let mut months = Vec::new();
    let mut regions = Vec::new();
    let mut sales = Vec::new();
    for i in 0..12 {
        months.push(month(i));
        regions.push("North");
        sales.push(100.0 + 10.0 * i as f64);

        months.push(month(i));
        regions.push("South");
        sales.push(165.0);
    }
    for (i, region, value) in extra {
        months.push(month(*i));
        regions.push(*region);
        sales.push(*value);
    }
    Table::new()
        .with_column("month", months)
        .unwrap()
        .with_column("region", regions)
        .unwrap()
        .with_column("sales", sales)
        .unwrap()
}

fn make_registry(providers: Vec<Box<dyn ForecastProvider>>) -> ForecastProviderRegistry {
    let mut registry = ForecastProviderRegistry::new();
    for p in providers {
        registry.register(p);
    }
    registry
}

fn make_dashboard() -> Dashboard {
    Dashboard::with_registry(
        EngineSettings::default(),
        make_registry(vec![Box::new(LinearTrendProvider::new())]),
    )
    .unwrap()
}

struct CountingProvider {
    calls: Arc<AtomicUsize>,
}

impl ForecastProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    fn fit_and_predict(
        &self,
        history: &[TimePoint],
        horizon: usize,
        cadence: &Cadence,
    ) -> Result<Vec<TimePoint>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        LinearTrendProvider::new().fit_and_predict(history, horizon, cadence)
    }
}

struct FailingProvider;

impl ForecastProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    fn fit_and_predict(
        &self,
        _history: &[TimePoint],
        _horizon: usize,
        _cadence: &Cadence,
    ) -> Result<Vec<TimePoint>, CoreError> {
        Err(CoreError::Forecast {
            provider: "failing".into(),
            message: "singular matrix".into(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════
// Scenario: monthly forecast
// ═══════════════════════════════════════════════════════════════════

mod monthly_forecast {
    use super::*;

    #[test]
    fn counts_and_continuity() {
        let config = ChartConfig::line("month", "sales").with_forecast(6);
        let data = make_dashboard()
            .render_chart(&make_monthly_table(), &config)
            .unwrap();

        assert_eq!(data.count(SegmentKind::Actual), 24);
        assert_eq!(data.count(SegmentKind::Forecast), 6);
        assert_eq!(data.count(SegmentKind::Connector), 2);
        assert_eq!(data.cadence, Some(Cadence::Monthly(MonthAnchor::Start)));

        let last_actual = data.points_of(SegmentKind::Actual).last().unwrap();
        let first_forecast = data.points_of(SegmentKind::Forecast).next().unwrap();
        assert_eq!(last_actual.x, XValue::Time(month(23)));
        assert_eq!(first_forecast.x, XValue::Time(month(24)));
        assert!((first_forecast.y - 220.0).abs() < 1e-6);
    }

    #[test]
    fn connectors_copy_the_bridged_points() {
        let config = ChartConfig::line("month", "sales").with_forecast(6);
        let data = make_dashboard()
            .render_chart(&make_monthly_table(), &config)
            .unwrap();

        let connectors: Vec<_> = data.points_of(SegmentKind::Connector).collect();
        let last_actual = data.points_of(SegmentKind::Actual).last().unwrap();
        let first_forecast = data.points_of(SegmentKind::Forecast).next().unwrap();

        assert_eq!((&connectors[0].x, connectors[0].y), (&last_actual.x, last_actual.y));
        assert_eq!((&connectors[1].x, connectors[1].y), (&first_forecast.x, first_forecast.y));
    }

    #[test]
    fn points_are_ordered_actual_forecast_connector() {
        let config = ChartConfig::line("month", "sales").with_forecast(3);
        let data = make_dashboard()
            .render_chart(&make_monthly_table(), &config)
            .unwrap();

        let kinds: Vec<_> = data.points.iter().map(|p| p.kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
    }

    #[test]
    fn horizon_slider_reuses_the_fit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dashboard = Dashboard::with_registry(
            EngineSettings::default(),
            make_registry(vec![Box::new(CountingProvider {
                calls: calls.clone(),
            })]),
        )
        .unwrap();
        let table = make_monthly_table();
        let config = ChartConfig::line("month", "sales").with_forecast(6);

        let h3 = dashboard.render_chart_with_horizon(&table, &config, 3).unwrap();
        let h9 = dashboard.render_chart_with_horizon(&table, &config, 9).unwrap();
        let h6 = dashboard.render_chart(&table, &config).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(dashboard.cache_len(), 1);

        let f3: Vec<_> = h3.points_of(SegmentKind::Forecast).cloned().collect();
        let f9: Vec<_> = h9.points_of(SegmentKind::Forecast).cloned().collect();
        assert_eq!(f3.len(), 3);
        assert_eq!(f9.len(), 9);
        assert_eq!(f3[..], f9[..3]);
        assert_eq!(h6.count(SegmentKind::Forecast), 6);
    }

    #[test]
    fn rendering_is_idempotent_and_leaves_input_alone() {
        let dashboard = make_dashboard();
        let table = make_monthly_table();
        let before = table.clone();
        let config = ChartConfig::line("month", "sales")
            .with_forecast(4)
            .with_trendline()
            .with_reference_line(Axis::Y, 150.0, "Target");

        let first = dashboard.render_chart(&table, &config).unwrap().to_json().unwrap();
        let second = dashboard.render_chart(&table, &config).unwrap().to_json().unwrap();

        assert_eq!(first, second);
        assert_eq!(table, before);
    }

    #[test]
    fn failing_primary_falls_back() {
        let dashboard = Dashboard::with_registry(
            EngineSettings::default(),
            make_registry(vec![
                Box::new(FailingProvider),
                Box::new(LinearTrendProvider::new()),
            ]),
        )
        .unwrap();
        let config = ChartConfig::line("month", "sales").with_forecast(2);

        let data = dashboard.render_chart(&make_monthly_table(), &config).unwrap();
        assert_eq!(data.count(SegmentKind::Forecast), 2);
    }

    #[test]
    fn all_providers_failing_still_renders_actuals() {
        let dashboard = Dashboard::with_registry(
            EngineSettings::default(),
            make_registry(vec![Box::new(FailingProvider)]),
        )
        .unwrap();
        let config = ChartConfig::line("month", "sales").with_forecast(2);

        let data = dashboard.render_chart(&make_monthly_table(), &config).unwrap();
        assert_eq!(data.count(SegmentKind::Actual), 24);
        assert!(!data.has_forecast());
        assert_eq!(data.count(SegmentKind::Connector), 0);
        assert_eq!(dashboard.cache_len(), 0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Scenario: regional comparison
// ═══════════════════════════════════════════════════════════════════

mod regional_comparison {
    use super::*;

    fn make_config() -> ChartConfig {
        ChartConfig::area("month", "sales")
            .with_category("region")
            .with_highlight("North", "South")
    }

    #[test]
    fn one_crossover_two_groups() {
        let data = make_dashboard()
            .render_chart(&make_regional_table(), &make_config())
            .unwrap();

        assert_eq!(data.area.len(), 2);
        assert_eq!(data.area[0].sign, AreaSign::Deficit);
        assert_eq!(data.area[1].sign, AreaSign::Surplus);

        let crossovers: Vec<_> = data
            .area
            .iter()
            .flat_map(|s| &s.bounds)
            .filter(|b| b.crossover)
            .collect();
        assert_eq!(crossovers.len(), 2);
        assert_eq!(crossovers[0].x, crossovers[1].x);
        assert!((crossovers[0].upper - 165.0).abs() < 1e-9);

        // Crossing lies strictly between month 6 and month 7.
        let XValue::Time(t) = crossovers[0].x else {
            panic!("expected a time axis");
        };
        assert!(t > month(6) && t < month(7));

        for bound in data.area.iter().flat_map(|s| &s.bounds) {
            assert!(bound.upper >= bound.lower);
        }
    }

    #[test]
    fn per_category_forecasts_and_connectors() {
        let config = make_config().with_forecast(3);
        let data = make_dashboard()
            .render_chart(&make_regional_table(), &config)
            .unwrap();

        assert_eq!(data.count(SegmentKind::Forecast), 6);
        assert_eq!(data.count(SegmentKind::Connector), 4);
        assert!(data.cadence.is_none());

        let south: Vec<_> = data
            .points_of(SegmentKind::Forecast)
            .filter(|p| p.category.as_deref() == Some("South"))
            .collect();
        assert!(south.iter().all(|p| (p.y - 165.0).abs() < 1e-9));
        // Forecast rows do not extend the shaded area.
        assert_eq!(data.area.len(), 2);
    }

    #[test]
    fn sparse_category_is_skipped() {
        let table = make_regional_table_with(&[(0, "East", 50.0)]);

        let config = ChartConfig::line("month", "sales")
            .with_category("region")
            .with_forecast(2);
        let data = make_dashboard().render_chart(&table, &config).unwrap();

        assert_eq!(data.count(SegmentKind::Actual), 25);
        assert!(data
            .points_of(SegmentKind::Forecast)
            .all(|p| p.category.as_deref() != Some("East")));
        assert_eq!(data.count(SegmentKind::Forecast), 4);
    }

    #[test]
    fn per_category_trendlines() {
        let config = ChartConfig::line("month", "sales")
            .with_category("region")
            .with_trendline();
        let data = make_dashboard()
            .render_chart(&make_regional_table(), &config)
            .unwrap();

        assert_eq!(data.trendline.len(), 4);
        assert_eq!(data.trendline[0].category.as_deref(), Some("North"));
        assert!((data.trendline[1].y - 210.0).abs() < 1e-9);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Dashboard facade
// ═══════════════════════════════════════════════════════════════════

mod dashboard {
    use super::*;

    #[test]
    fn default_dashboard_uses_default_chain() {
        let dashboard = Dashboard::new();
        assert_eq!(dashboard.provider_names(), vec!["ets", "linear_trend"]);
        assert_eq!(dashboard.settings(), &EngineSettings::default());
        assert_eq!(dashboard.cache_len(), 0);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = EngineSettings {
            min_history: 0,
            ..EngineSettings::default()
        };
        assert!(matches!(
            Dashboard::with_settings(settings),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn shared_cache_serves_both_dashboards() {
        let shared = Arc::new(ForecastCache::new());
        let a = make_dashboard().with_cache(Arc::clone(&shared));
        let b = make_dashboard().with_cache(Arc::clone(&shared));
        let config = ChartConfig::line("month", "sales").with_forecast(3);

        a.render_chart(&make_monthly_table(), &config).unwrap();
        assert_eq!(b.cache_len(), 1);
        assert!(Arc::ptr_eq(a.cache(), b.cache()));
    }

    #[test]
    fn cache_snapshot_round_trip() {
        let make_counting = |calls: &Arc<AtomicUsize>| {
            Dashboard::with_registry(
                EngineSettings::default(),
                make_registry(vec![Box::new(CountingProvider {
                    calls: Arc::clone(calls),
                })]),
            )
            .unwrap()
        };
        let config = ChartConfig::line("month", "sales").with_forecast(3);
        let table = make_monthly_table();

        let source_calls = Arc::new(AtomicUsize::new(0));
        let source = make_counting(&source_calls);
        let expected = source.render_chart(&table, &config).unwrap();
        let bytes = source.save_cache_to_bytes().unwrap();

        let target_calls = Arc::new(AtomicUsize::new(0));
        let target = make_counting(&target_calls);
        assert_eq!(target.load_cache_from_bytes(&bytes).unwrap(), 1);

        let rendered = target.render_chart(&table, &config).unwrap();
        assert_eq!(rendered, expected);
        assert_eq!(source_calls.load(Ordering::SeqCst), 1);
        assert_eq!(target_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn debug_output_summarises_state() {
        let debug = format!("{:?}", make_dashboard());
        assert!(debug.contains("Dashboard"));
        assert!(debug.contains("linear_trend"));
        assert!(debug.contains("cached_forecasts"));
    }

    #[test]
    fn json_input_end_to_end() {
        let table = Table::from_json_records(
            r#"[{"month": "2024-01-01", "sales": 10},
                {"month": "2024-02-01", "sales": 12},
                {"month": "2024-03-01", "sales": 14}]"#,
        )
        .unwrap();
        let config = ChartConfig::from_json(
            r#"{"kind": "line", "x_field": "month", "y_field": "sales",
                "forecast": {"horizon": 2}}"#,
        )
        .unwrap();

        let data = make_dashboard().render_chart(&table, &config).unwrap();
        let forecast: Vec<_> = data.points_of(SegmentKind::Forecast).collect();
        assert_eq!(forecast.len(), 2);
        assert_eq!(
            forecast[0].x,
            XValue::Time(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap().and_hms_opt(0, 0, 0).unwrap())
        );
        assert!((forecast[1].y - 18.0).abs() < 1e-9);
    }
}

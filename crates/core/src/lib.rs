pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use models::{cache::ForecastCache, chart::ChartData, config::ChartConfig, settings::EngineSettings, table::Table};
use providers::registry::ForecastProviderRegistry;
use services::chart_service::ChartService;
use storage::manager::CacheStore;

use errors::CoreError;

/// Main entry point for the chartcast core library.
/// Holds the engine settings, the forecast cache and the services that turn
/// tables into chart data.
///
/// Every method takes `&self`; one dashboard can serve concurrent sessions,
/// and several dashboards can share one cache through [`Dashboard::with_cache`].
#[must_use]
pub struct Dashboard {
    chart_service: ChartService,
    cache: Arc<ForecastCache>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("settings", self.chart_service.settings())
            .field("providers", &self.provider_names())
            .field("cached_forecasts", &self.cache.len())
            .finish()
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    /// Create a dashboard with default settings, the default provider chain
    /// and an empty cache.
    pub fn new() -> Self {
        Self::build(EngineSettings::default(), None, Arc::new(ForecastCache::new()))
    }

    /// Create a dashboard with custom settings (validated).
    pub fn with_settings(settings: EngineSettings) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self::build(settings, None, Arc::new(ForecastCache::new())))
    }

    /// Create a dashboard with an explicit provider chain instead of the
    /// one named in `settings.providers`.
    pub fn with_registry(
        settings: EngineSettings,
        registry: ForecastProviderRegistry,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self::build(settings, Some(registry), Arc::new(ForecastCache::new())))
    }

    /// Use a shared cache (e.g. one process-wide cache for all dashboards).
    pub fn with_cache(self, cache: Arc<ForecastCache>) -> Self {
        Self { cache, ..self }
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Compute the chart data for `config` at its configured horizon.
    pub fn render_chart(&self, table: &Table, config: &ChartConfig) -> Result<ChartData, CoreError> {
        self.chart_service.assemble(table, config, &self.cache, None)
    }

    /// Compute the chart data with an explicit forecast horizon
    /// (e.g. from an interactive slider). Fits are shared with every other
    /// horizon of the same series.
    pub fn render_chart_with_horizon(
        &self,
        table: &Table,
        config: &ChartConfig,
        requested_horizon: usize,
    ) -> Result<ChartData, CoreError> {
        self.chart_service
            .assemble(table, config, &self.cache, Some(requested_horizon))
    }

    // ── Settings & Providers ────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        self.chart_service.settings()
    }

    /// Names of the forecast providers, in fallback order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.chart_service.forecast_service().registry().names()
    }

    // ── Cache Management ────────────────────────────────────────────

    #[must_use]
    pub fn cache(&self) -> &Arc<ForecastCache> {
        &self.cache
    }

    /// Number of fitted forecasts currently cached.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Snapshot the cache to bytes the frontend can write to a file.
    pub fn save_cache_to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        CacheStore::save_to_bytes(&self.cache)
    }

    /// Merge a snapshot into the cache. Returns the number of entries added.
    pub fn load_cache_from_bytes(&self, data: &[u8]) -> Result<usize, CoreError> {
        CacheStore::load_from_bytes(data, &self.cache)
    }

    /// Snapshot the cache to a file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_cache_to_file(&self, path: &str) -> Result<(), CoreError> {
        CacheStore::save_to_file(&self.cache, path)
    }

    /// Merge a snapshot file from disk into the cache (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_cache_from_file(&self, path: &str) -> Result<usize, CoreError> {
        CacheStore::load_from_file(path, &self.cache)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(
        settings: EngineSettings,
        registry: Option<ForecastProviderRegistry>,
        cache: Arc<ForecastCache>,
    ) -> Self {
        let registry =
            registry.unwrap_or_else(|| ForecastProviderRegistry::new_with_defaults(&settings));
        let chart_service = ChartService::new(registry, settings);

        Self {
            chart_service,
            cache,
        }
    }
}

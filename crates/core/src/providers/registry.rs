use crate::models::settings::EngineSettings;

use super::ets::EtsProvider;
use super::linear_trend::LinearTrendProvider;
use super::trailing_average::TrailingAverageProvider;
use super::traits::ForecastProvider;

/// Ordered list of forecast providers.
///
/// The first provider is the primary model; the rest are fallbacks tried
/// in registration order when an earlier one fails.
pub struct ForecastProviderRegistry {
    providers: Vec<Box<dyn ForecastProvider>>,
}

impl ForecastProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with the built-in providers named in `settings.providers`,
    /// in that order. Unknown names are skipped.
    pub fn new_with_defaults(settings: &EngineSettings) -> Self {
        let mut registry = Self::new();

        for name in &settings.providers {
            match name.as_str() {
                "ets" => registry.register(Box::new(EtsProvider::new(settings.confidence_level))),
                "linear_trend" => registry.register(Box::new(LinearTrendProvider::new())),
                "trailing_average" => registry.register(Box::new(TrailingAverageProvider::new(
                    settings.trailing_window,
                ))),
                unknown => {
                    tracing::warn!(provider = unknown, "Ignoring unknown forecast provider");
                }
            }
        }

        registry
    }

    /// Register a provider after all existing ones.
    pub fn register(&mut self, provider: Box<dyn ForecastProvider>) {
        self.providers.push(provider);
    }

    /// All providers, in fallback order.
    pub fn providers(&self) -> impl Iterator<Item = &dyn ForecastProvider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Identifier of the whole chain, e.g. "ets>linear_trend".
    /// Part of every cache key, so a different chain never reuses a fit.
    pub fn signature(&self) -> String {
        self.names().join(">")
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ForecastProviderRegistry {
    fn default() -> Self {
        Self::new_with_defaults(&EngineSettings::default())
    }
}

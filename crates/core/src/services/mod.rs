pub mod chart_service;
pub mod connector_service;
pub mod diff_area_service;
pub mod forecast_service;
pub mod frequency_service;
pub mod trendline_service;

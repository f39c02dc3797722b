pub mod registry;
pub mod traits;

// Built-in forecasting models
pub mod ets;
pub mod linear_trend;
pub mod trailing_average;

pub mod area;
pub mod cache;
pub mod cadence;
pub mod chart;
pub mod config;
pub mod series;
pub mod settings;
pub mod table;

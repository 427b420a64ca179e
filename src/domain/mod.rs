//! Core domain types and logic.

pub mod config_validation;
pub mod error;
pub mod position;
pub mod price_series;
pub mod rounding;
pub mod series_stats;
pub mod signal;
pub mod signal_library;
pub mod simulator;
pub mod sweep;
pub mod trade;

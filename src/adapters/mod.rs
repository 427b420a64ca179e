//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_recorder;
pub mod file_config_adapter;
#[cfg(feature = "http")]
pub mod http_price_adapter;
#[cfg(feature = "http")]
pub mod http_recorder;
pub mod memory_recorder;

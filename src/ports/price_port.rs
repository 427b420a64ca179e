//! Price history access port.

use crate::domain::error::SignalTraderError;
use crate::domain::price_series::PriceSeries;

pub trait PricePort {
    /// Daily prices for `symbol`, oldest first.
    fn fetch_prices(&self, symbol: &str) -> Result<PriceSeries, SignalTraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, SignalTraderError>;
}

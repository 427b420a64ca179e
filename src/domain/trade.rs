//! Executed trade events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn is_buy(self) -> bool {
        matches!(self, TradeSide::Buy)
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// One executed buy or sell. Written once by the simulator, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub symbol: String,
    pub day: usize,
    pub side: TradeSide,
    pub unit_price: f64,
    pub units: f64,
    pub cash_after: f64,
    /// Sell triggered by the horizon rather than the sell signal.
    pub forced: bool,
    pub timestamp: DateTime<Utc>,
}

impl TradeEvent {
    pub fn is_buy(&self) -> bool {
        self.side.is_buy()
    }

    /// `units * unit_price`, before rounding.
    pub fn notional(&self) -> f64 {
        self.units * self.unit_price
    }
}

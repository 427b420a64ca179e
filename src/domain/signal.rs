//! Signal capability and the named built-in signals.
//!
//! The simulator only sees [`Signal`]. Built-ins are selected by name through
//! [`BuiltinSignal`]; any closure can be wrapped with [`FnSignal`].

use crate::domain::error::SignalTraderError;
use crate::domain::price_series::PriceSeries;
use crate::domain::signal_library as lib;
use crate::domain::trade::TradeSide;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A stateless buy or sell rule.
pub trait Signal: Send + Sync {
    fn evaluate(&self, series: &PriceSeries, day: usize, price: f64, rate: f64) -> bool;

    /// Smallest day index the rule can be evaluated on.
    fn min_history(&self) -> usize {
        0
    }

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinSignal {
    BuyAtRate,
    SellAtRate,
    BuyAtValley,
    SellAtPeak,
    BuyAtDecrease,
    SellAtIncrease,
    BuyAtThreeDecrease,
    SellAtThreeIncrease,
    BuyAtDate,
    SellAtDate,
}

impl BuiltinSignal {
    pub const ALL: [BuiltinSignal; 10] = [
        BuiltinSignal::BuyAtRate,
        BuiltinSignal::SellAtRate,
        BuiltinSignal::BuyAtValley,
        BuiltinSignal::SellAtPeak,
        BuiltinSignal::BuyAtDecrease,
        BuiltinSignal::SellAtIncrease,
        BuiltinSignal::BuyAtThreeDecrease,
        BuiltinSignal::SellAtThreeIncrease,
        BuiltinSignal::BuyAtDate,
        BuiltinSignal::SellAtDate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuiltinSignal::BuyAtRate => "buy_at_rate",
            BuiltinSignal::SellAtRate => "sell_at_rate",
            BuiltinSignal::BuyAtValley => "buy_at_valley",
            BuiltinSignal::SellAtPeak => "sell_at_peak",
            BuiltinSignal::BuyAtDecrease => "buy_at_decrease",
            BuiltinSignal::SellAtIncrease => "sell_at_increase",
            BuiltinSignal::BuyAtThreeDecrease => "buy_at_three_decrease",
            BuiltinSignal::SellAtThreeIncrease => "sell_at_three_increase",
            BuiltinSignal::BuyAtDate => "buy_at_date",
            BuiltinSignal::SellAtDate => "sell_at_date",
        }
    }

    /// The side this rule is written for.
    pub fn side(self) -> TradeSide {
        match self {
            BuiltinSignal::BuyAtRate
            | BuiltinSignal::BuyAtValley
            | BuiltinSignal::BuyAtDecrease
            | BuiltinSignal::BuyAtThreeDecrease
            | BuiltinSignal::BuyAtDate => TradeSide::Buy,
            _ => TradeSide::Sell,
        }
    }

    pub fn uses_rate(self) -> bool {
        matches!(self, BuiltinSignal::BuyAtRate | BuiltinSignal::SellAtRate)
    }

    pub fn description(self) -> &'static str {
        match self {
            BuiltinSignal::BuyAtRate => "price below the buy rate",
            BuiltinSignal::SellAtRate => "price above the sell rate",
            BuiltinSignal::BuyAtValley => "price below both neighbouring days",
            BuiltinSignal::SellAtPeak => "price above both neighbouring days",
            BuiltinSignal::BuyAtDecrease => "previous day 20% of today's price lower",
            BuiltinSignal::SellAtIncrease => "price 20% above the previous day",
            BuiltinSignal::BuyAtThreeDecrease => "three strictly falling days",
            BuiltinSignal::SellAtThreeIncrease => "three strictly rising days",
            BuiltinSignal::BuyAtDate => "day number ending in 1",
            BuiltinSignal::SellAtDate => "day number ending in 5",
        }
    }

    fn predicate(self) -> fn(&PriceSeries, usize, f64, f64) -> bool {
        match self {
            BuiltinSignal::BuyAtRate => lib::buy_at_rate,
            BuiltinSignal::SellAtRate => lib::sell_at_rate,
            BuiltinSignal::BuyAtValley => lib::buy_at_valley,
            BuiltinSignal::SellAtPeak => lib::sell_at_peak,
            BuiltinSignal::BuyAtDecrease => lib::buy_at_decrease,
            BuiltinSignal::SellAtIncrease => lib::sell_at_increase,
            BuiltinSignal::BuyAtThreeDecrease => lib::buy_at_three_decrease,
            BuiltinSignal::SellAtThreeIncrease => lib::sell_at_three_increase,
            BuiltinSignal::BuyAtDate => lib::buy_at_date,
            BuiltinSignal::SellAtDate => lib::sell_at_date,
        }
    }
}

impl Signal for BuiltinSignal {
    fn evaluate(&self, series: &PriceSeries, day: usize, price: f64, rate: f64) -> bool {
        (self.predicate())(series, day, price, rate)
    }

    fn min_history(&self) -> usize {
        match self {
            BuiltinSignal::BuyAtThreeDecrease | BuiltinSignal::SellAtThreeIncrease => 2,
            _ => 0,
        }
    }

    fn name(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BuiltinSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuiltinSignal {
    type Err = SignalTraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        BuiltinSignal::ALL
            .into_iter()
            .find(|sig| sig.as_str() == wanted)
            .ok_or_else(|| SignalTraderError::UnknownSignal {
                name: s.trim().to_string(),
            })
    }
}

/// Wraps a closure as a [`Signal`].
pub struct FnSignal<F> {
    name: String,
    min_history: usize,
    f: F,
}

impl<F> FnSignal<F>
where
    F: Fn(&PriceSeries, usize, f64, f64) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        FnSignal {
            name: name.into(),
            min_history: 0,
            f,
        }
    }

    pub fn with_min_history(mut self, days: usize) -> Self {
        self.min_history = days;
        self
    }
}

impl<F> Signal for FnSignal<F>
where
    F: Fn(&PriceSeries, usize, f64, f64) -> bool + Send + Sync,
{
    fn evaluate(&self, series: &PriceSeries, day: usize, price: f64, rate: f64) -> bool {
        (self.f)(series, day, price, rate)
    }

    fn min_history(&self) -> usize {
        self.min_history
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A buy rule, a sell rule, and the rates handed to each.
#[derive(Clone)]
pub struct SignalPair {
    pub buy: Arc<dyn Signal>,
    pub sell: Arc<dyn Signal>,
    pub buy_rate: f64,
    pub sell_rate: f64,
}

impl SignalPair {
    pub fn new(buy: Arc<dyn Signal>, sell: Arc<dyn Signal>, buy_rate: f64, sell_rate: f64) -> Self {
        SignalPair {
            buy,
            sell,
            buy_rate,
            sell_rate,
        }
    }

    pub fn builtin(buy: BuiltinSignal, sell: BuiltinSignal, buy_rate: f64, sell_rate: f64) -> Self {
        Self::new(Arc::new(buy), Arc::new(sell), buy_rate, sell_rate)
    }

    pub fn with_rates(&self, buy_rate: f64, sell_rate: f64) -> Self {
        SignalPair {
            buy_rate,
            sell_rate,
            ..self.clone()
        }
    }
}

impl fmt::Debug for SignalPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalPair")
            .field("buy", &self.buy.name())
            .field("sell", &self.sell.name())
            .field("buy_rate", &self.buy_rate)
            .field("sell_rate", &self.sell_rate)
            .finish()
    }
}

impl fmt::Display for SignalPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) / {}({})",
            self.buy.name(),
            self.buy_rate,
            self.sell.name(),
            self.sell_rate
        )
    }
}

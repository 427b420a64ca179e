//! All-in/all-out position accounting.

use crate::domain::rounding::{round_cash, round_units};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    Flat,
    Holding,
}

/// A cash/units split for a single instrument.
///
/// A buy converts all cash into units, a sell converts all units back into
/// cash. There is never a partial position.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub cash: f64,
    pub units: f64,
}

/// Result of a buy or sell against a [`Position`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub units: f64,
    pub price: f64,
    pub cash_after: f64,
}

impl Position {
    pub fn new(starting_cash: f64) -> Self {
        Position {
            cash: starting_cash,
            units: 0.0,
        }
    }

    pub fn state(&self) -> PositionState {
        if self.units > 0.0 {
            PositionState::Holding
        } else {
            PositionState::Flat
        }
    }

    pub fn is_flat(&self) -> bool {
        self.state() == PositionState::Flat
    }

    pub fn is_holding(&self) -> bool {
        self.state() == PositionState::Holding
    }

    /// Cash must exceed the price; a zero price never fills.
    pub fn can_buy(&self, price: f64) -> bool {
        self.is_flat() && price > 0.0 && self.cash > price
    }

    /// Units are rounded to one decimal, the remaining cash to two.
    ///
    /// Rounding units up can leave a small negative cash residual; it is
    /// discarded by the next sell, which replaces cash with the sale proceeds.
    pub fn buy_all(&mut self, price: f64) -> Option<Fill> {
        if !self.can_buy(price) {
            return None;
        }
        let units = round_units(self.cash / price);
        self.cash = round_cash(self.cash - units * price);
        self.units = units;
        Some(Fill {
            units,
            price,
            cash_after: self.cash,
        })
    }

    /// Cash becomes the rounded sale proceeds.
    pub fn sell_all(&mut self, price: f64) -> Option<Fill> {
        if !self.is_holding() {
            return None;
        }
        let units = self.units;
        self.cash = round_cash(units * price);
        self.units = 0.0;
        Some(Fill {
            units,
            price,
            cash_after: self.cash,
        })
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.cash + self.units * price
    }
}

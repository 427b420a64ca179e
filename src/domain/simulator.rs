//! Single-instrument trading simulation.
//!
//! # State machine
//!
//! The simulator walks the series in day order (0-based) with a [`Position`]
//! that is either `Flat` or `Holding`. On each day at most one transition
//! happens:
//!
//! 1. `Flat`, buy signal fires and cash exceeds the price: buy with all cash.
//! 2. Otherwise, `Holding` and the sell signal fires (or the day is the
//!    forced-liquidation day): sell all units.
//!
//! A signal is only consulted once `day >= signal.min_history()`. Days at or
//! past `horizon_days` are never processed. The forced-liquidation day is
//! `horizon_days - 1`, pulled in to the last day of a shorter series when
//! `liquidate_at_end` is set. No buy opens on the liquidation day.

use chrono::Utc;

use crate::domain::position::{Fill, Position, PositionState};
use crate::domain::price_series::PriceSeries;
use crate::domain::signal::{Signal, SignalPair};
use crate::domain::trade::{TradeEvent, TradeSide};
use crate::ports::recorder_port::TradeRecorder;

/// Trading days in the simulated year.
pub const DEFAULT_HORIZON_DAYS: usize = 365;

pub const DEFAULT_STARTING_CASH: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub starting_cash: f64,
    pub horizon_days: usize,
    pub liquidate_at_end: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            starting_cash: DEFAULT_STARTING_CASH,
            horizon_days: DEFAULT_HORIZON_DAYS,
            liquidate_at_end: true,
        }
    }
}

impl SimulationConfig {
    pub fn with_starting_cash(starting_cash: f64) -> Self {
        SimulationConfig {
            starting_cash,
            ..Self::default()
        }
    }
}

/// Position at the close of one processed day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySnapshot {
    pub day: usize,
    pub price: f64,
    pub cash: f64,
    pub units: f64,
    pub state: PositionState,
}

impl DailySnapshot {
    pub fn equity(&self) -> f64 {
        self.cash + self.units * self.price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub symbol: String,
    pub starting_cash: f64,
    /// Cash when the run ended. Rounding units up on a buy can leave this
    /// slightly negative while holding, so it may stay below zero when
    /// liquidation is off.
    pub final_cash: f64,
    /// Units still held when the run ended; zero unless liquidation was off.
    pub final_units: f64,
    pub trades: Vec<TradeEvent>,
    pub trace: Vec<DailySnapshot>,
}

impl SimulationResult {
    pub fn profit(&self) -> f64 {
        self.final_cash - self.starting_cash
    }

    pub fn return_pct(&self) -> f64 {
        if self.starting_cash > 0.0 {
            self.profit() / self.starting_cash * 100.0
        } else {
            0.0
        }
    }

    pub fn buy_count(&self) -> usize {
        self.trades.iter().filter(|t| t.is_buy()).count()
    }

    pub fn sell_count(&self) -> usize {
        self.trades.iter().filter(|t| !t.is_buy()).count()
    }

    pub fn was_force_liquidated(&self) -> bool {
        self.trades.iter().any(|t| t.forced)
    }
}

/// Runs signal pairs over one owned price series.
pub struct Simulator<'r> {
    symbol: String,
    series: PriceSeries,
    config: SimulationConfig,
    recorder: Option<&'r dyn TradeRecorder>,
}

impl<'r> Simulator<'r> {
    pub fn new(symbol: impl Into<String>, series: PriceSeries, config: SimulationConfig) -> Self {
        Simulator {
            symbol: symbol.into(),
            series,
            config,
            recorder: None,
        }
    }

    pub fn with_recorder(mut self, recorder: &'r dyn TradeRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn liquidation_day(&self) -> Option<usize> {
        let horizon_last = self.config.horizon_days.checked_sub(1)?;
        if self.config.liquidate_at_end {
            self.series.last_index().map(|last| last.min(horizon_last))
        } else {
            Some(horizon_last)
        }
    }

    pub fn run_pair(&self, pair: &SignalPair) -> SimulationResult {
        self.run(
            pair.buy.as_ref(),
            pair.sell.as_ref(),
            pair.buy_rate,
            pair.sell_rate,
        )
    }

    pub fn run(
        &self,
        buy: &dyn Signal,
        sell: &dyn Signal,
        buy_rate: f64,
        sell_rate: f64,
    ) -> SimulationResult {
        let mut position = Position::new(self.config.starting_cash);
        let liquidation_day = self.liquidation_day();
        let days = self.series.len().min(self.config.horizon_days);
        let mut trades = Vec::new();
        let mut trace = Vec::with_capacity(days);

        for (day, price) in self.series.iter().take(days) {
            let forced = liquidation_day == Some(day);

            if position.is_flat() {
                if !forced && self.fires(buy, day, price, buy_rate) {
                    if let Some(fill) = position.buy_all(price) {
                        trades.push(self.emit(day, TradeSide::Buy, fill, false));
                    }
                }
            } else {
                let by_signal = self.fires(sell, day, price, sell_rate);
                if by_signal || forced {
                    if let Some(fill) = position.sell_all(price) {
                        trades.push(self.emit(day, TradeSide::Sell, fill, !by_signal));
                    }
                }
            }

            trace.push(DailySnapshot {
                day,
                price,
                cash: position.cash,
                units: position.units,
                state: position.state(),
            });
        }

        tracing::debug!(
            symbol = %self.symbol,
            days,
            trades = trades.len(),
            final_cash = position.cash,
            "simulation finished"
        );

        SimulationResult {
            symbol: self.symbol.clone(),
            starting_cash: self.config.starting_cash,
            final_cash: position.cash,
            final_units: position.units,
            trades,
            trace,
        }
    }

    fn fires(&self, signal: &dyn Signal, day: usize, price: f64, rate: f64) -> bool {
        day >= signal.min_history() && signal.evaluate(&self.series, day, price, rate)
    }

    fn emit(&self, day: usize, side: TradeSide, fill: Fill, forced: bool) -> TradeEvent {
        let event = TradeEvent {
            symbol: self.symbol.clone(),
            day,
            side,
            unit_price: fill.price,
            units: fill.units,
            cash_after: fill.cash_after,
            forced,
            timestamp: Utc::now(),
        };
        tracing::debug!(
            symbol = %event.symbol,
            day,
            side = %side,
            price = fill.price,
            units = fill.units,
            cash = fill.cash_after,
            forced,
            "trade executed"
        );

        if let Some(recorder) = self.recorder {
            if let Err(e) = recorder.record(&event) {
                tracing::warn!(symbol = %event.symbol, day, error = %e, "failed to record trade");
            }
        }

        event
    }
}

//! Independent simulation runs executed in parallel.
//!
//! Each job owns its series and builds its own [`Simulator`], so jobs share
//! nothing but the optional recorder. Results come back in job order.

use rayon::prelude::*;
use std::str::FromStr;

use crate::domain::price_series::PriceSeries;
use crate::domain::signal::SignalPair;
use crate::domain::simulator::{SimulationConfig, SimulationResult, Simulator};
use crate::ports::recorder_port::TradeRecorder;

#[derive(Debug, Clone)]
pub struct SweepJob {
    pub symbol: String,
    pub series: PriceSeries,
    pub pair: SignalPair,
    pub config: SimulationConfig,
}

impl SweepJob {
    pub fn run(&self, recorder: Option<&dyn TradeRecorder>) -> SimulationResult {
        let simulator = Simulator::new(self.symbol.clone(), self.series.clone(), self.config.clone());
        match recorder {
            Some(r) => simulator.with_recorder(r).run_pair(&self.pair),
            None => simulator.run_pair(&self.pair),
        }
    }
}

pub fn run_parallel(jobs: &[SweepJob], recorder: Option<&dyn TradeRecorder>) -> Vec<SimulationResult> {
    tracing::info!(
        jobs = jobs.len(),
        threads = rayon::current_num_threads(),
        "running simulations"
    );
    jobs.par_iter().map(|job| job.run(recorder)).collect()
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateRangeError {
    #[error("invalid rate range '{0}' (expected start:end:step or a single value)")]
    Malformed(String),

    #[error("rate range step must be positive")]
    NonPositiveStep,

    #[error("rate range end {end} is below start {start}")]
    Reversed { start: f64, end: f64 },
}

/// Inclusive `start..=end` in increments of `step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateRange {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl RateRange {
    pub fn single(value: f64) -> Self {
        RateRange {
            start: value,
            end: value,
            step: 1.0,
        }
    }

    pub fn values(&self) -> Vec<f64> {
        let tolerance = self.step * 1e-9;
        let mut out = Vec::new();
        let mut i = 0u32;
        loop {
            let v = self.start + f64::from(i) * self.step;
            if v > self.end + tolerance {
                break;
            }
            out.push(v);
            i += 1;
        }
        out
    }
}

impl FromStr for RateRange {
    type Err = RateRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| RateRangeError::Malformed(s.to_string()))
        };

        let parts: Vec<&str> = s.split(':').collect();
        let range = match parts.as_slice() {
            [single] => RateRange::single(parse(single)?),
            [start, end, step] => RateRange {
                start: parse(start)?,
                end: parse(end)?,
                step: parse(step)?,
            },
            _ => return Err(RateRangeError::Malformed(s.to_string())),
        };

        if range.step <= 0.0 {
            return Err(RateRangeError::NonPositiveStep);
        }
        if range.end < range.start {
            return Err(RateRangeError::Reversed {
                start: range.start,
                end: range.end,
            });
        }
        Ok(range)
    }
}

/// Every `(buy_rate, sell_rate)` combination, buy-major.
pub fn rate_grid(buy: &RateRange, sell: &RateRange) -> Vec<(f64, f64)> {
    let sells = sell.values();
    buy.values()
        .into_iter()
        .flat_map(|b| sells.iter().map(move |&s| (b, s)))
        .collect()
}

pub fn rate_sweep_jobs(
    symbol: &str,
    series: &PriceSeries,
    pair: &SignalPair,
    config: &SimulationConfig,
    grid: &[(f64, f64)],
) -> Vec<SweepJob> {
    grid.iter()
        .map(|&(buy_rate, sell_rate)| SweepJob {
            symbol: symbol.to_string(),
            series: series.clone(),
            pair: pair.with_rates(buy_rate, sell_rate),
            config: config.clone(),
        })
        .collect()
}

/// The `n` jobs with the highest final cash, best first.
pub fn top_by_final_cash<'a>(
    jobs: &'a [SweepJob],
    results: &'a [SimulationResult],
    n: usize,
) -> Vec<(&'a SweepJob, &'a SimulationResult)> {
    let mut ranked: Vec<_> = jobs.iter().zip(results).collect();
    ranked.sort_by(|a, b| b.1.final_cash.total_cmp(&a.1.final_cash));
    ranked.truncate(n);
    ranked
}

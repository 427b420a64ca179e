#![allow(dead_code)]

use signaltrader::domain::error::SignalTraderError;
use signaltrader::domain::price_series::PriceSeries;
use signaltrader::domain::simulator::{SimulationConfig, Simulator};
use signaltrader::ports::price_port::PricePort;
use std::collections::BTreeMap;
use std::io::Write;

pub struct MockPricePort {
    pub data: BTreeMap<String, Vec<f64>>,
    pub errors: BTreeMap<String, String>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn with_prices(mut self, symbol: &str, prices: &[f64]) -> Self {
        self.data.insert(symbol.to_string(), prices.to_vec());
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_prices(&self, symbol: &str) -> Result<PriceSeries, SignalTraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SignalTraderError::PriceData {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(prices) => PriceSeries::new(prices.clone()),
            None => Err(SignalTraderError::PriceData {
                reason: format!("unknown symbol {symbol}"),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, SignalTraderError> {
        Ok(self.data.keys().cloned().collect())
    }
}

pub fn series(prices: &[f64]) -> PriceSeries {
    PriceSeries::new(prices.to_vec()).unwrap()
}

pub fn simulator<'r>(prices: &[f64], starting_cash: f64) -> Simulator<'r> {
    Simulator::new(
        "TST",
        series(prices),
        SimulationConfig::with_starting_cash(starting_cash),
    )
}

/// `[55, 48, 52, 61, 58]`: rate 50/60 buys day 1 and sells day 3.
pub const RATE_SERIES: [f64; 5] = [55.0, 48.0, 52.0, 61.0, 58.0];

/// `[100, 90, 80, 95, 110]`: three-decrease buys day 2, three-increase sells day 4.
pub const VALLEY_SERIES: [f64; 5] = [100.0, 90.0, 80.0, 95.0, 110.0];

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn write_price_csv(dir: &std::path::Path, symbol: &str, prices: &[f64]) {
    let mut content = String::from("date,value\n");
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for (i, price) in prices.iter().enumerate() {
        let date = start + chrono::Duration::days(i as i64);
        content.push_str(&format!("{},{}\n", date.format("%Y-%m-%d"), price));
    }
    std::fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}

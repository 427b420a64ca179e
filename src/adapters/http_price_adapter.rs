//! Remote JSON price history adapter.
//!
//! Fetches `url_template` with `{symbol}` substituted and reads
//! `{"history": [{"value": ...}, ...]}`, oldest first. Values may be JSON
//! numbers or numeric strings.

use serde::Deserialize;
use std::time::Duration;

use crate::domain::error::SignalTraderError;
use crate::domain::price_series::PriceSeries;
use crate::ports::price_port::PricePort;

pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    value: serde_json::Value,
}

pub struct HttpPriceAdapter {
    client: reqwest::blocking::Client,
    url_template: String,
    symbols: Vec<String>,
}

impl HttpPriceAdapter {
    pub fn new(
        url_template: impl Into<String>,
        symbols: Vec<String>,
        timeout: Duration,
    ) -> Result<Self, SignalTraderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SignalTraderError::PriceData {
                reason: format!("failed to build http client: {e}"),
            })?;
        Ok(Self {
            client,
            url_template: url_template.into(),
            symbols,
        })
    }

    pub fn url_for(&self, symbol: &str) -> String {
        self.url_template.replace(SYMBOL_PLACEHOLDER, symbol)
    }
}

pub fn parse_history(body: &str) -> Result<PriceSeries, SignalTraderError> {
    let response: HistoryResponse =
        serde_json::from_str(body).map_err(|e| SignalTraderError::PriceData {
            reason: format!("invalid history response: {e}"),
        })?;

    let prices = response
        .history
        .iter()
        .enumerate()
        .map(|(day, entry)| {
            let value = match &entry.value {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            value.ok_or_else(|| SignalTraderError::PriceData {
                reason: format!("non-numeric value on day {day}: {}", entry.value),
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    PriceSeries::new(prices)
}

impl PricePort for HttpPriceAdapter {
    fn fetch_prices(&self, symbol: &str) -> Result<PriceSeries, SignalTraderError> {
        let url = self.url_for(symbol);
        tracing::debug!(%symbol, %url, "fetching price history");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| SignalTraderError::PriceData {
                reason: format!("request for {symbol} failed: {e}"),
            })?;
        if !response.status().is_success() {
            return Err(SignalTraderError::PriceData {
                reason: format!("request for {symbol} returned {}", response.status()),
            });
        }
        let body = response.text().map_err(|e| SignalTraderError::PriceData {
            reason: format!("failed to read response for {symbol}: {e}"),
        })?;

        parse_history(&body)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SignalTraderError> {
        Ok(self.symbols.clone())
    }
}

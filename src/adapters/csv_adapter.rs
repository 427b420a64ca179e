//! CSV file price adapter.
//!
//! One file per symbol, `{base_path}/{SYMBOL}.csv`, with a `value` column and
//! an optional `date` column (`YYYY-MM-DD`). Rows are returned oldest first.

use crate::domain::error::SignalTraderError;
use crate::domain::price_series::PriceSeries;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

impl PricePort for CsvAdapter {
    fn fetch_prices(&self, symbol: &str) -> Result<PriceSeries, SignalTraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| SignalTraderError::PriceData {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| SignalTraderError::PriceData {
                reason: format!("CSV parse error: {}", e),
            })?
            .clone();
        let value_col = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case("value"))
            .ok_or_else(|| SignalTraderError::PriceData {
                reason: format!("{}: missing value column", path.display()),
            })?;
        let date_col = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case("date"));

        let mut rows: Vec<(Option<NaiveDate>, f64)> = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| SignalTraderError::PriceData {
                reason: format!("CSV parse error: {}", e),
            })?;

            let value: f64 = record
                .get(value_col)
                .ok_or_else(|| SignalTraderError::PriceData {
                    reason: "missing value field".into(),
                })?
                .trim()
                .parse()
                .map_err(|e| SignalTraderError::PriceData {
                    reason: format!("invalid value: {}", e),
                })?;

            let date = match date_col.and_then(|c| record.get(c)) {
                Some(s) => Some(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
                    SignalTraderError::PriceData {
                        reason: format!("invalid date format: {}", e),
                    }
                })?),
                None => None,
            };

            rows.push((date, value));
        }

        // stable: undated files keep file order
        rows.sort_by_key(|(date, _)| *date);
        PriceSeries::new(rows.into_iter().map(|(_, v)| v).collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, SignalTraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SignalTraderError::PriceData {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SignalTraderError::PriceData {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

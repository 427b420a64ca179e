//! Appends executed trades to a CSV file.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::error::RecorderError;
use crate::domain::trade::TradeEvent;
use crate::ports::recorder_port::TradeRecorder;

const HEADER: [&str; 8] = [
    "timestamp",
    "symbol",
    "day",
    "side",
    "unit_price",
    "units",
    "cash_after",
    "forced",
];

pub struct CsvRecorder {
    path: PathBuf,
    // serializes appends from parallel runs
    lock: Mutex<()>,
}

impl CsvRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TradeRecorder for CsvRecorder {
    fn record(&self, event: &TradeEvent) -> Result<(), RecorderError> {
        let _guard = self.lock.lock().map_err(|_| RecorderError::Poisoned)?;

        let is_new = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::Writer::from_writer(file);

        if is_new {
            writer.write_record(HEADER)?;
        }
        writer.write_record([
            event.timestamp.to_rfc3339(),
            event.symbol.clone(),
            event.day.to_string(),
            event.side.to_string(),
            event.unit_price.to_string(),
            event.units.to_string(),
            event.cash_after.to_string(),
            event.forced.to_string(),
        ])?;
        writer.flush()?;
        Ok(())
    }
}

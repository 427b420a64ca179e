//! Posts executed trades to a remote endpoint as JSON.

use serde::Serialize;
use std::time::Duration;

use crate::domain::error::RecorderError;
use crate::domain::trade::{TradeEvent, TradeSide};
use crate::ports::recorder_port::TradeRecorder;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Body of the trade POST.
#[derive(Debug, Serialize)]
struct TradePayload<'a> {
    symbol: &'a str,
    side: TradeSide,
    price: f64,
    quantity: f64,
    timestamp: String,
}

impl<'a> From<&'a TradeEvent> for TradePayload<'a> {
    fn from(event: &'a TradeEvent) -> Self {
        TradePayload {
            symbol: &event.symbol,
            side: event.side,
            price: event.unit_price,
            quantity: event.units,
            timestamp: event.timestamp.to_rfc3339(),
        }
    }
}

pub struct HttpRecorder {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpRecorder {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RecorderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RecorderError::Transport {
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TradeRecorder for HttpRecorder {
    fn record(&self, event: &TradeEvent) -> Result<(), RecorderError> {
        let response = self
            .client
            .post(&self.url)
            .json(&TradePayload::from(event))
            .send()
            .map_err(|e| RecorderError::Transport {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RecorderError::Rejected {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

//! In-process trade recorder.

use std::sync::Mutex;

use crate::domain::error::RecorderError;
use crate::domain::trade::TradeEvent;
use crate::ports::recorder_port::TradeRecorder;

#[derive(Debug, Default)]
pub struct MemoryRecorder {
    events: Mutex<Vec<TradeEvent>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recorded events, in the order they arrived.
    pub fn events(&self) -> Vec<TradeEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn events_for(&self, symbol: &str) -> Vec<TradeEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.symbol == symbol)
            .collect()
    }
}

impl TradeRecorder for MemoryRecorder {
    fn record(&self, event: &TradeEvent) -> Result<(), RecorderError> {
        self.events
            .lock()
            .map_err(|_| RecorderError::Poisoned)?
            .push(event.clone());
        Ok(())
    }
}

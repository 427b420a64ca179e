//! Trade recording port.
//!
//! Recording is best-effort: the simulator logs a failed `record` and carries
//! on with the trade already applied.

use crate::domain::error::RecorderError;
use crate::domain::trade::TradeEvent;

pub trait TradeRecorder: Send + Sync {
    fn record(&self, event: &TradeEvent) -> Result<(), RecorderError>;
}

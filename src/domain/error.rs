//! Domain error types.

/// Top-level error type for signaltrader.
#[derive(Debug, thiserror::Error)]
pub enum SignalTraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown signal: {name}")]
    UnknownSignal { name: String },

    #[error("price data error: {reason}")]
    PriceData { reason: String },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("invalid price {value} on day {day}")]
    InvalidPrice { day: usize, value: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure to hand a trade to a recorder. Logged and dropped by the simulator.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("recorder request failed: {reason}")]
    Transport { reason: String },

    #[error("recorder rejected trade with status {status}")]
    Rejected { status: u16 },

    #[error("recorder csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("recorder lock poisoned")]
    Poisoned,
}

impl SignalTraderError {
    /// Process exit status for this error family.
    pub fn exit_status(&self) -> u8 {
        match self {
            SignalTraderError::Io(_) => 1,
            SignalTraderError::ConfigParse { .. }
            | SignalTraderError::ConfigMissing { .. }
            | SignalTraderError::ConfigInvalid { .. } => 2,
            SignalTraderError::PriceData { .. } | SignalTraderError::InvalidPrice { .. } => 3,
            SignalTraderError::UnknownSignal { .. } => 4,
            SignalTraderError::NoData { .. } => 5,
        }
    }
}

impl From<&SignalTraderError> for std::process::ExitCode {
    fn from(err: &SignalTraderError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

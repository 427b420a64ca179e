//! Configuration validation.
//!
//! Runs before any price data is fetched. Numeric getters on [`ConfigPort`]
//! fall back to defaults on garbage, so values are checked from their raw
//! strings here.

use crate::domain::error::SignalTraderError;
use crate::domain::signal::BuiltinSignal;
use crate::ports::config_port::ConfigPort;

pub const SIMULATION: &str = "simulation";
pub const DATA: &str = "data";
pub const STRATEGY: &str = "strategy";
pub const RECORDER: &str = "recorder";

/// Name of the per-symbol strategy override section.
pub fn strategy_section(symbol: &str) -> String {
    format!("{STRATEGY}:{symbol}")
}

/// Splits a comma-separated symbol list, upper-cased, blanks dropped.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Symbols named in `[data]` (`symbols` wins over `symbol`).
pub fn configured_symbols(config: &dyn ConfigPort) -> Vec<String> {
    config
        .get_string(DATA, "symbols")
        .or_else(|| config.get_string(DATA, "symbol"))
        .map(|raw| parse_symbols(&raw))
        .unwrap_or_default()
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SignalTraderError> {
    validate_simulation_config(config)?;
    validate_data_config(config)?;
    validate_strategy_config(config)?;
    validate_recorder_config(config)?;
    Ok(())
}

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), SignalTraderError> {
    if let Some(cash) = optional_number(config, SIMULATION, "starting_cash")? {
        if cash <= 0.0 {
            return Err(invalid(SIMULATION, "starting_cash", "starting_cash must be positive"));
        }
    }

    if let Some(raw) = non_blank(config, SIMULATION, "horizon_days") {
        raw.parse::<usize>().map_err(|_| {
            invalid(
                SIMULATION,
                "horizon_days",
                "horizon_days must be a non-negative integer",
            )
        })?;
    }

    if let Some(raw) = non_blank(config, SIMULATION, "liquidate_at_end") {
        let known = matches!(
            raw.to_lowercase().as_str(),
            "true" | "yes" | "on" | "1" | "false" | "no" | "off" | "0"
        );
        if !known {
            return Err(invalid(
                SIMULATION,
                "liquidate_at_end",
                "liquidate_at_end must be true or false",
            ));
        }
    }
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), SignalTraderError> {
    let source = non_blank(config, DATA, "source").unwrap_or_else(|| "csv".to_string());
    match source.to_lowercase().as_str() {
        "csv" => {
            require(config, DATA, "csv_dir")?;
        }
        "http" => {
            if !cfg!(feature = "http") {
                return Err(invalid(DATA, "source", "built without http support"));
            }
            let template = require(config, DATA, "url_template")?;
            if !template.contains("{symbol}") {
                return Err(invalid(
                    DATA,
                    "url_template",
                    "url_template must contain {symbol}",
                ));
            }
            if configured_symbols(config).is_empty() {
                return Err(SignalTraderError::ConfigMissing {
                    section: DATA.to_string(),
                    key: "symbols".to_string(),
                });
            }
        }
        other => {
            return Err(invalid(
                DATA,
                "source",
                &format!("unknown source '{other}' (expected csv or http)"),
            ));
        }
    }
    validate_timeout(config, DATA)
}

/// Checks the base `[strategy]` section and every `[strategy:SYMBOL]`
/// override for the symbols in `[data]`.
pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SignalTraderError> {
    validate_strategy_layer(config, &[STRATEGY])?;
    for symbol in configured_symbols(config) {
        let section = strategy_section(&symbol);
        validate_strategy_layer(config, &[section.as_str(), STRATEGY])?;
    }
    Ok(())
}

fn validate_strategy_layer(
    config: &dyn ConfigPort,
    sections: &[&str],
) -> Result<(), SignalTraderError> {
    let owner = sections[0];
    for key in ["buy_signal", "sell_signal"] {
        let name = config
            .get_string_layered(sections, key)
            .ok_or_else(|| SignalTraderError::ConfigMissing {
                section: owner.to_string(),
                key: key.to_string(),
            })?;
        name.parse::<BuiltinSignal>()?;
    }
    for key in ["buy_rate", "sell_rate"] {
        if let Some(raw) = config.get_string_layered(sections, key) {
            parse_number(&raw).ok_or_else(|| invalid(owner, key, "rate must be a finite number"))?;
        }
    }
    Ok(())
}

pub fn validate_recorder_config(config: &dyn ConfigPort) -> Result<(), SignalTraderError> {
    let kind = non_blank(config, RECORDER, "kind").unwrap_or_else(|| "none".to_string());
    match kind.to_lowercase().as_str() {
        "none" => Ok(()),
        "csv" => require(config, RECORDER, "path").map(|_| ()),
        "http" => {
            if !cfg!(feature = "http") {
                return Err(invalid(RECORDER, "kind", "built without http support"));
            }
            require(config, RECORDER, "url")?;
            validate_timeout(config, RECORDER)
        }
        other => Err(invalid(
            RECORDER,
            "kind",
            &format!("unknown recorder '{other}' (expected none, csv or http)"),
        )),
    }
}

fn validate_timeout(config: &dyn ConfigPort, section: &str) -> Result<(), SignalTraderError> {
    if let Some(raw) = non_blank(config, section, "timeout_ms") {
        match raw.parse::<u64>() {
            Ok(ms) if ms > 0 => {}
            _ => {
                return Err(invalid(
                    section,
                    "timeout_ms",
                    "timeout_ms must be a positive integer",
                ))
            }
        }
    }
    Ok(())
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn optional_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, SignalTraderError> {
    match non_blank(config, section, key) {
        None => Ok(None),
        Some(raw) => parse_number(&raw)
            .map(Some)
            .ok_or_else(|| invalid(section, key, &format!("{key} must be a finite number"))),
    }
}

fn non_blank(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, SignalTraderError> {
    non_blank(config, section, key).ok_or_else(|| SignalTraderError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    })
}

fn invalid(section: &str, key: &str, reason: &str) -> SignalTraderError {
    SignalTraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

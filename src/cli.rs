//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_recorder::CsvRecorder;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    configured_symbols, strategy_section, validate_config, validate_data_config, DATA, RECORDER,
    SIMULATION, STRATEGY,
};
use crate::domain::error::SignalTraderError;
use crate::domain::series_stats::SeriesStats;
use crate::domain::signal::{BuiltinSignal, SignalPair};
use crate::domain::simulator::{
    SimulationConfig, SimulationResult, DEFAULT_HORIZON_DAYS, DEFAULT_STARTING_CASH,
};
use crate::domain::sweep::{
    rate_grid, rate_sweep_jobs, run_parallel, top_by_final_cash, RateRange, SweepJob,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::recorder_port::TradeRecorder;

pub const DEFAULT_PRICE_TIMEOUT_MS: i64 = 10_000;

#[derive(Parser, Debug)]
#[command(name = "signaltrader", about = "Single-instrument signal backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the configured strategy over every symbol
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        buy_signal: Option<String>,
        #[arg(long)]
        sell_signal: Option<String>,
        #[arg(long)]
        buy_rate: Option<f64>,
        #[arg(long)]
        sell_rate: Option<f64>,
        /// Also print every executed trade
        #[arg(long)]
        trades: bool,
        #[arg(long)]
        dry_run: bool,
    },
    /// Print descriptive statistics of the price series
    Stats {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Try every buy/sell rate combination for one symbol
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        /// start:end:step or a single value
        #[arg(long)]
        buy_rates: RateRange,
        #[arg(long)]
        sell_rates: RateRange,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// List the built-in signals
    Signals,
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line replacements for `[strategy]` keys, applied to every symbol.
#[derive(Debug, Clone, Default)]
pub struct StrategyOverrides {
    pub buy_signal: Option<String>,
    pub sell_signal: Option<String>,
    pub buy_rate: Option<f64>,
    pub sell_rate: Option<f64>,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            symbol,
            buy_signal,
            sell_signal,
            buy_rate,
            sell_rate,
            trades,
            dry_run,
        } => {
            let overrides = StrategyOverrides {
                buy_signal,
                sell_signal,
                buy_rate,
                sell_rate,
            };
            if dry_run {
                run_dry_run(&config, symbol.as_deref(), &overrides)
            } else {
                run_backtest(&config, symbol.as_deref(), &overrides, trades)
            }
        }
        Command::Stats { config, symbol } => run_stats(&config, symbol.as_deref()),
        Command::Sweep {
            config,
            symbol,
            buy_rates,
            sell_rates,
            top,
        } => run_sweep(&config, &symbol, &buy_rates, &sell_rates, top),
        Command::Signals => {
            print_signals();
            Ok(())
        }
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SignalTraderError> {
    FileConfigAdapter::from_file(path).map_err(|e| SignalTraderError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Loads and validates a configuration file.
pub fn load_validated(path: &Path) -> Result<FileConfigAdapter, SignalTraderError> {
    tracing::info!(path = %path.display(), "loading config");
    let adapter = load_config(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

pub fn build_simulation_config(config: &dyn ConfigPort) -> SimulationConfig {
    let horizon = config.get_int(SIMULATION, "horizon_days", DEFAULT_HORIZON_DAYS as i64);
    SimulationConfig {
        starting_cash: config.get_double(SIMULATION, "starting_cash", DEFAULT_STARTING_CASH),
        horizon_days: usize::try_from(horizon).unwrap_or(0),
        liquidate_at_end: config.get_bool(SIMULATION, "liquidate_at_end", true),
    }
}

/// The signal pair for `symbol`: command-line overrides, then
/// `[strategy:SYMBOL]`, then `[strategy]`. Missing rates are zero.
pub fn build_signal_pair(
    config: &dyn ConfigPort,
    symbol: &str,
    overrides: &StrategyOverrides,
) -> Result<SignalPair, SignalTraderError> {
    let section = strategy_section(symbol);
    let sections = [section.as_str(), STRATEGY];

    let signal = |key: &str, over: &Option<String>| -> Result<BuiltinSignal, SignalTraderError> {
        let name = over
            .clone()
            .or_else(|| config.get_string_layered(&sections, key))
            .ok_or_else(|| SignalTraderError::ConfigMissing {
                section: STRATEGY.to_string(),
                key: key.to_string(),
            })?;
        name.parse()
    };
    let rate = |key: &str, over: Option<f64>| -> Result<f64, SignalTraderError> {
        if let Some(v) = over {
            return Ok(v);
        }
        match config.get_string_layered(&sections, key) {
            None => Ok(0.0),
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| SignalTraderError::ConfigInvalid {
                    section: section.clone(),
                    key: key.to_string(),
                    reason: format!("'{raw}' is not a finite number"),
                }),
        }
    };

    Ok(SignalPair::builtin(
        signal("buy_signal", &overrides.buy_signal)?,
        signal("sell_signal", &overrides.sell_signal)?,
        rate("buy_rate", overrides.buy_rate)?,
        rate("sell_rate", overrides.sell_rate)?,
    ))
}

/// Symbols to run: the command-line symbol, the `[data]` list, or every
/// symbol the price source knows about.
pub fn resolve_symbols(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
    prices: &dyn PricePort,
) -> Result<Vec<String>, SignalTraderError> {
    if let Some(s) = symbol_override {
        return Ok(vec![s.trim().to_uppercase()]);
    }

    let configured = configured_symbols(config);
    if !configured.is_empty() {
        return Ok(configured);
    }

    let listed = prices.list_symbols()?;
    if listed.is_empty() {
        return Err(SignalTraderError::ConfigMissing {
            section: DATA.to_string(),
            key: "symbols".to_string(),
        });
    }
    Ok(listed)
}

pub fn build_price_port(config: &dyn ConfigPort) -> Result<Box<dyn PricePort>, SignalTraderError> {
    let source = config
        .get_string(DATA, "source")
        .unwrap_or_else(|| "csv".to_string())
        .trim()
        .to_lowercase();

    match source.as_str() {
        "csv" => {
            let dir = config
                .get_string(DATA, "csv_dir")
                .ok_or_else(|| SignalTraderError::ConfigMissing {
                    section: DATA.to_string(),
                    key: "csv_dir".to_string(),
                })?;
            Ok(Box::new(CsvAdapter::new(PathBuf::from(dir.trim()))))
        }
        #[cfg(feature = "http")]
        "http" => {
            use crate::adapters::http_price_adapter::HttpPriceAdapter;

            let template = config
                .get_string(DATA, "url_template")
                .ok_or_else(|| SignalTraderError::ConfigMissing {
                    section: DATA.to_string(),
                    key: "url_template".to_string(),
                })?;
            let timeout = timeout_from(config, DATA, DEFAULT_PRICE_TIMEOUT_MS);
            Ok(Box::new(HttpPriceAdapter::new(
                template.trim(),
                configured_symbols(config),
                timeout,
            )?))
        }
        other => Err(SignalTraderError::ConfigInvalid {
            section: DATA.to_string(),
            key: "source".to_string(),
            reason: format!("unsupported source '{other}'"),
        }),
    }
}

pub fn build_recorder(
    config: &dyn ConfigPort,
) -> Result<Option<Box<dyn TradeRecorder>>, SignalTraderError> {
    let kind = config
        .get_string(RECORDER, "kind")
        .unwrap_or_else(|| "none".to_string())
        .trim()
        .to_lowercase();

    match kind.as_str() {
        "none" => Ok(None),
        "csv" => {
            let path = config
                .get_string(RECORDER, "path")
                .ok_or_else(|| SignalTraderError::ConfigMissing {
                    section: RECORDER.to_string(),
                    key: "path".to_string(),
                })?;
            Ok(Some(Box::new(CsvRecorder::new(path.trim()))))
        }
        #[cfg(feature = "http")]
        "http" => {
            use crate::adapters::http_recorder::{HttpRecorder, DEFAULT_TIMEOUT};

            let url = config
                .get_string(RECORDER, "url")
                .ok_or_else(|| SignalTraderError::ConfigMissing {
                    section: RECORDER.to_string(),
                    key: "url".to_string(),
                })?;
            let timeout = timeout_from(config, RECORDER, DEFAULT_TIMEOUT.as_millis() as i64);
            let recorder = HttpRecorder::new(url.trim(), timeout).map_err(|e| {
                SignalTraderError::ConfigInvalid {
                    section: RECORDER.to_string(),
                    key: "url".to_string(),
                    reason: e.to_string(),
                }
            })?;
            Ok(Some(Box::new(recorder)))
        }
        other => Err(SignalTraderError::ConfigInvalid {
            section: RECORDER.to_string(),
            key: "kind".to_string(),
            reason: format!("unsupported recorder '{other}'"),
        }),
    }
}

#[cfg_attr(not(feature = "http"), allow(dead_code))]
fn timeout_from(config: &dyn ConfigPort, section: &str, default_ms: i64) -> Duration {
    let ms = config.get_int(section, "timeout_ms", default_ms).max(1);
    Duration::from_millis(ms.unsigned_abs())
}

/// One job per symbol. Symbols whose prices cannot be loaded are skipped.
pub fn build_jobs(
    config: &dyn ConfigPort,
    prices: &dyn PricePort,
    symbols: &[String],
    overrides: &StrategyOverrides,
) -> Result<Vec<SweepJob>, SignalTraderError> {
    let sim_config = build_simulation_config(config);
    let mut jobs = Vec::with_capacity(symbols.len());

    for symbol in symbols {
        let pair = build_signal_pair(config, symbol, overrides)?;
        let series = match prices.fetch_prices(symbol) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "skipping symbol");
                continue;
            }
        };
        tracing::info!(%symbol, days = series.len(), strategy = %pair, "loaded prices");
        jobs.push(SweepJob {
            symbol: symbol.clone(),
            series,
            pair,
            config: sim_config.clone(),
        });
    }

    if jobs.is_empty() {
        return Err(SignalTraderError::NoData {
            symbol: symbols.join(", "),
        });
    }
    Ok(jobs)
}

fn run_backtest(
    config_path: &Path,
    symbol: Option<&str>,
    overrides: &StrategyOverrides,
    show_trades: bool,
) -> Result<(), SignalTraderError> {
    let adapter = load_validated(config_path)?;
    let prices = build_price_port(&adapter)?;
    let symbols = resolve_symbols(symbol, &adapter, prices.as_ref())?;
    let recorder = build_recorder(&adapter)?;

    let jobs = build_jobs(&adapter, prices.as_ref(), &symbols, overrides)?;
    let results = run_parallel(&jobs, recorder.as_deref());

    println!("{}", results_table(&jobs, &results));
    if show_trades {
        println!("{}", trades_table(&results));
    }
    Ok(())
}

pub fn run_dry_run(
    config_path: &Path,
    symbol: Option<&str>,
    overrides: &StrategyOverrides,
) -> Result<(), SignalTraderError> {
    let adapter = load_validated(config_path)?;
    let sim_config = build_simulation_config(&adapter);
    let prices = build_price_port(&adapter)?;
    let symbols = resolve_symbols(symbol, &adapter, prices.as_ref())?;

    println!("Simulation:");
    println!("  starting cash:    {:.2}", sim_config.starting_cash);
    println!("  horizon (days):   {}", sim_config.horizon_days);
    println!("  liquidate at end: {}", sim_config.liquidate_at_end);
    println!("\nStrategies:");
    for symbol in &symbols {
        let pair = build_signal_pair(&adapter, symbol, overrides)?;
        println!("  {symbol}: {pair}");
    }
    println!("\nDry run complete: configuration is valid");
    Ok(())
}

fn run_stats(config_path: &Path, symbol: Option<&str>) -> Result<(), SignalTraderError> {
    let adapter = load_config(config_path)?;
    validate_data_config(&adapter)?;
    let prices = build_price_port(&adapter)?;
    let symbols = resolve_symbols(symbol, &adapter, prices.as_ref())?;

    let mut rows = Vec::new();
    for symbol in &symbols {
        let series = match prices.fetch_prices(symbol) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "skipping symbol");
                continue;
            }
        };
        match SeriesStats::compute(&series) {
            Some(stats) => rows.push((symbol.clone(), series.len(), stats)),
            None => tracing::warn!(%symbol, days = series.len(), "too few prices for statistics"),
        }
    }

    if rows.is_empty() {
        return Err(SignalTraderError::NoData {
            symbol: symbols.join(", "),
        });
    }
    println!("{}", stats_table(&rows));
    Ok(())
}

fn run_sweep(
    config_path: &Path,
    symbol: &str,
    buy_rates: &RateRange,
    sell_rates: &RateRange,
    top: usize,
) -> Result<(), SignalTraderError> {
    let adapter = load_validated(config_path)?;
    let prices = build_price_port(&adapter)?;
    let symbol = symbol.trim().to_uppercase();

    let pair = build_signal_pair(&adapter, &symbol, &StrategyOverrides::default())?;
    let series = prices.fetch_prices(&symbol)?;
    let grid = rate_grid(buy_rates, sell_rates);
    tracing::info!(%symbol, combinations = grid.len(), strategy = %pair, "starting sweep");

    let jobs = rate_sweep_jobs(&symbol, &series, &pair, &build_simulation_config(&adapter), &grid);
    let results = run_parallel(&jobs, None);
    let best = top_by_final_cash(&jobs, &results, top);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Rank",
        "Buy rate",
        "Sell rate",
        "Final cash",
        "Return %",
        "Trades",
    ]);
    for (rank, (job, result)) in best.iter().enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            format!("{}", job.pair.buy_rate),
            format!("{}", job.pair.sell_rate),
            format!("{:.2}", result.final_cash),
            format!("{:.2}", result.return_pct()),
            result.trades.len().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), SignalTraderError> {
    let adapter = load_validated(config_path)?;
    for symbol in configured_symbols(&adapter) {
        let pair = build_signal_pair(&adapter, &symbol, &StrategyOverrides::default())?;
        println!("  {symbol}: {pair}");
    }
    println!("Configuration is valid.");
    Ok(())
}

fn print_signals() {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Signal", "Side", "Uses rate", "Fires when"]);
    for signal in BuiltinSignal::ALL {
        table.add_row(vec![
            signal.as_str().to_string(),
            signal.side().to_string(),
            if signal.uses_rate() { "yes" } else { "no" }.to_string(),
            signal.description().to_string(),
        ]);
    }
    println!("{table}");
}

pub fn results_table(jobs: &[SweepJob], results: &[SimulationResult]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Symbol",
        "Strategy",
        "Start cash",
        "Final cash",
        "Profit",
        "Return %",
        "Buys",
        "Sells",
        "Forced exit",
    ]);
    for (job, result) in jobs.iter().zip(results) {
        table.add_row(vec![
            result.symbol.clone(),
            job.pair.to_string(),
            format!("{:.2}", result.starting_cash),
            format!("{:.2}", result.final_cash),
            format!("{:.2}", result.profit()),
            format!("{:.2}", result.return_pct()),
            result.buy_count().to_string(),
            result.sell_count().to_string(),
            if result.was_force_liquidated() { "yes" } else { "no" }.to_string(),
        ]);
    }
    table
}

pub fn trades_table(results: &[SimulationResult]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Symbol", "Day", "Side", "Price", "Units", "Cash after", "Forced",
    ]);
    for trade in results.iter().flat_map(|r| &r.trades) {
        table.add_row(vec![
            trade.symbol.clone(),
            trade.day.to_string(),
            trade.side.to_string(),
            format!("{}", trade.unit_price),
            format!("{}", trade.units),
            format!("{:.2}", trade.cash_after),
            trade.forced.to_string(),
        ]);
    }
    table
}

pub fn stats_table(rows: &[(String, usize, SeriesStats)]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Symbol", "Days", "Mean", "Min", "Max", "Std dev", "Q1", "Median", "Q3", "Range", "IQR",
        "Up", "Down", "Longest up", "Longest down",
    ]);
    for (symbol, days, s) in rows {
        table.add_row(vec![
            symbol.clone(),
            days.to_string(),
            format!("{:.2}", s.mean),
            format!("{:.2}", s.min),
            format!("{:.2}", s.max),
            format!("{:.2}", s.std_dev),
            format!("{:.2}", s.q1),
            format!("{:.2}", s.q2),
            format!("{:.2}", s.q3),
            format!("{:.2}", s.range),
            format!("{:.2}", s.iqr),
            s.up_days.to_string(),
            s.down_days.to_string(),
            s.longest_up.to_string(),
            s.longest_down.to_string(),
        ]);
    }
    table
}

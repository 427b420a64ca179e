//! CLI integration tests for configuration handling and orchestration.
//!
//! Tests cover:
//! - Config parsing (build_simulation_config, build_signal_pair)
//! - Symbol resolution (resolve_symbols)
//! - Price port and recorder construction from config
//! - Dry-run mode with real INI files and CSV prices on disk
//! - Job building with a mock price port

mod common;

use common::*;
use signaltrader::adapters::file_config_adapter::FileConfigAdapter;
use signaltrader::cli::{self, StrategyOverrides};
use signaltrader::domain::error::SignalTraderError;
use signaltrader::domain::simulator::{DEFAULT_HORIZON_DAYS, DEFAULT_STARTING_CASH};
use signaltrader::domain::sweep::run_parallel;
use tempfile::TempDir;

const VALID_INI: &str = r#"
[simulation]
starting_cash = 1000
horizon_days = 30
liquidate_at_end = true

[data]
source = csv
csv_dir = prices
symbols = ALB, BHA

[strategy]
buy_signal = buy_at_rate
sell_signal = sell_at_rate
buy_rate = 50
sell_rate = 60

[strategy:BHA]
buy_signal = buy_at_three_decrease
sell_signal = sell_at_three_increase
"#;

fn config(content: &str) -> FileConfigAdapter {
    FileConfigAdapter::from_string(content).unwrap()
}

mod config_loading {
    use super::*;

    #[test]
    fn build_simulation_config_reads_values() {
        let sim = cli::build_simulation_config(&config(VALID_INI));
        assert_eq!(sim.starting_cash, 1000.0);
        assert_eq!(sim.horizon_days, 30);
        assert!(sim.liquidate_at_end);
    }

    #[test]
    fn build_simulation_config_uses_defaults() {
        let sim = cli::build_simulation_config(&config("[simulation]\n"));
        assert_eq!(sim.starting_cash, DEFAULT_STARTING_CASH);
        assert_eq!(sim.horizon_days, DEFAULT_HORIZON_DAYS);
        assert!(sim.liquidate_at_end);
    }

    #[test]
    fn load_config_missing_file() {
        let Err(err) = cli::load_config(std::path::Path::new("/nonexistent/config.ini")) else {
            panic!("expected a missing config file to fail");
        };
        assert!(matches!(err, SignalTraderError::ConfigParse { .. }));
        assert_eq!(err.exit_status(), 2);
    }
}

mod signal_pairs {
    use super::*;

    #[test]
    fn base_strategy_applies_to_unlisted_symbol() {
        let pair = cli::build_signal_pair(&config(VALID_INI), "ALB", &StrategyOverrides::default())
            .unwrap();
        assert_eq!(pair.to_string(), "buy_at_rate(50) / sell_at_rate(60)");
    }

    #[test]
    fn symbol_section_overrides_signals_and_inherits_rates() {
        let pair = cli::build_signal_pair(&config(VALID_INI), "BHA", &StrategyOverrides::default())
            .unwrap();
        assert_eq!(pair.buy.name(), "buy_at_three_decrease");
        assert_eq!(pair.sell.name(), "sell_at_three_increase");
        assert_eq!(pair.buy_rate, 50.0);
    }

    #[test]
    fn command_line_overrides_win() {
        let overrides = StrategyOverrides {
            buy_signal: Some("buy-at-valley".into()),
            sell_signal: None,
            buy_rate: None,
            sell_rate: Some(75.0),
        };
        let pair = cli::build_signal_pair(&config(VALID_INI), "BHA", &overrides).unwrap();
        assert_eq!(pair.buy.name(), "buy_at_valley");
        assert_eq!(pair.sell.name(), "sell_at_three_increase");
        assert_eq!(pair.sell_rate, 75.0);
    }

    #[test]
    fn missing_rates_default_to_zero() {
        let ini = "[strategy]\nbuy_signal = buy_at_date\nsell_signal = sell_at_date\n";
        let pair = cli::build_signal_pair(&config(ini), "ALB", &StrategyOverrides::default())
            .unwrap();
        assert_eq!(pair.buy_rate, 0.0);
        assert_eq!(pair.sell_rate, 0.0);
    }

    #[test]
    fn unknown_signal_is_reported() {
        let overrides = StrategyOverrides {
            sell_signal: Some("sell_at_full_moon".into()),
            ..StrategyOverrides::default()
        };
        let err = cli::build_signal_pair(&config(VALID_INI), "ALB", &overrides).unwrap_err();
        assert!(matches!(err, SignalTraderError::UnknownSignal { .. }));
        assert_eq!(err.exit_status(), 4);
    }

    #[test]
    fn missing_signal_is_reported() {
        let err = cli::build_signal_pair(
            &config("[strategy]\nbuy_signal = buy_at_rate\n"),
            "ALB",
            &StrategyOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SignalTraderError::ConfigMissing { key, .. } if key == "sell_signal"));
    }
}

mod symbol_resolution {
    use super::*;

    #[test]
    fn override_takes_precedence() {
        let port = MockPricePort::new().with_prices("CRE", &[1.0]);
        let symbols = cli::resolve_symbols(Some(" alb "), &config(VALID_INI), &port).unwrap();
        assert_eq!(symbols, vec!["ALB"]);
    }

    #[test]
    fn configured_list_used_next() {
        let port = MockPricePort::new().with_prices("CRE", &[1.0]);
        let symbols = cli::resolve_symbols(None, &config(VALID_INI), &port).unwrap();
        assert_eq!(symbols, vec!["ALB", "BHA"]);
    }

    #[test]
    fn falls_back_to_price_source_listing() {
        let port = MockPricePort::new()
            .with_prices("CRE", &[1.0])
            .with_prices("ALB", &[1.0]);
        let symbols = cli::resolve_symbols(None, &config("[data]\ncsv_dir = x\n"), &port).unwrap();
        assert_eq!(symbols, vec!["ALB", "CRE"]);
    }

    #[test]
    fn nothing_available_is_an_error() {
        let err = cli::resolve_symbols(None, &config("[data]\n"), &MockPricePort::new()).unwrap_err();
        assert!(matches!(err, SignalTraderError::ConfigMissing { key, .. } if key == "symbols"));
    }
}

mod ports_from_config {
    use super::*;

    #[test]
    fn csv_price_port_reads_directory() {
        let dir = TempDir::new().unwrap();
        write_price_csv(dir.path(), "ALB", &RATE_SERIES);
        let ini = format!("[data]\nsource = csv\ncsv_dir = {}\n", dir.path().display());

        let port = cli::build_price_port(&config(&ini)).unwrap();
        assert_eq!(port.list_symbols().unwrap(), vec!["ALB"]);
        assert_eq!(port.fetch_prices("ALB").unwrap().as_slice(), &RATE_SERIES);
    }

    #[test]
    fn unknown_source_is_rejected() {
        let result = cli::build_price_port(&config("[data]\nsource = carrier\n"));
        assert!(matches!(result, Err(SignalTraderError::ConfigInvalid { .. })));
    }

    #[test]
    fn recorder_defaults_to_none() {
        assert!(cli::build_recorder(&config("[data]\n")).unwrap().is_none());
    }

    #[test]
    fn csv_recorder_writes_trades() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        let ini = format!("[recorder]\nkind = csv\npath = {}\n", path.display());
        let recorder = cli::build_recorder(&config(&ini)).unwrap().unwrap();

        simulator(&RATE_SERIES, 1000.0)
            .with_recorder(recorder.as_ref())
            .run_pair(
                &cli::build_signal_pair(&config(VALID_INI), "ALB", &StrategyOverrides::default())
                    .unwrap(),
            );

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,symbol,day,side"));
        assert!(lines[1].contains(",TST,1,buy,"));
        assert!(lines[2].contains(",TST,3,sell,"));
    }

    #[cfg(feature = "http")]
    #[test]
    fn http_recorder_built_from_config() {
        let ini = "[recorder]\nkind = http\nurl = http://127.0.0.1:9/trades\ntimeout_ms = 100\n";
        assert!(cli::build_recorder(&config(ini)).unwrap().is_some());
    }
}

mod jobs {
    use super::*;

    #[test]
    fn failing_symbols_are_skipped() {
        let port = MockPricePort::new()
            .with_prices("ALB", &RATE_SERIES)
            .with_error("BHA", "connection reset");
        let symbols = vec!["ALB".to_string(), "BHA".to_string()];

        let jobs =
            cli::build_jobs(&config(VALID_INI), &port, &symbols, &StrategyOverrides::default())
                .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].symbol, "ALB");
        assert_eq!(jobs[0].config.horizon_days, 30);

        let results = run_parallel(&jobs, None);
        assert_eq!(results[0].final_cash, 1268.8);
    }

    #[test]
    fn no_loadable_symbols_is_no_data() {
        let port = MockPricePort::new().with_error("ALB", "gone");
        let err = cli::build_jobs(
            &config(VALID_INI),
            &port,
            &["ALB".to_string()],
            &StrategyOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SignalTraderError::NoData { .. }));
        assert_eq!(err.exit_status(), 5);
    }

    #[test]
    fn per_symbol_strategies_differ() {
        let port = MockPricePort::new()
            .with_prices("ALB", &RATE_SERIES)
            .with_prices("BHA", &VALLEY_SERIES);
        let symbols = vec!["ALB".to_string(), "BHA".to_string()];
        let jobs =
            cli::build_jobs(&config(VALID_INI), &port, &symbols, &StrategyOverrides::default())
                .unwrap();
        let results = run_parallel(&jobs, None);
        assert_eq!(results[0].final_cash, 1268.8);
        assert_eq!(results[1].final_cash, 1375.0);

        let table = cli::results_table(&jobs, &results).to_string();
        assert!(table.contains("1268.80"));
        assert!(table.contains("buy_at_three_decrease"));
    }
}

mod dry_run {
    use super::*;

    fn ini_for(dir: &TempDir) -> String {
        VALID_INI.replace("csv_dir = prices", &format!("csv_dir = {}", dir.path().display()))
    }

    #[test]
    fn dry_run_valid_config_succeeds() {
        let dir = TempDir::new().unwrap();
        let file = write_temp_ini(&ini_for(&dir));
        assert!(cli::run_dry_run(file.path(), None, &StrategyOverrides::default()).is_ok());
    }

    #[test]
    fn dry_run_missing_file_fails() {
        let err = cli::run_dry_run(
            std::path::Path::new("/nonexistent/path/config.ini"),
            None,
            &StrategyOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SignalTraderError::ConfigParse { .. }));
    }

    #[test]
    fn dry_run_invalid_signal_fails() {
        let dir = TempDir::new().unwrap();
        let ini = ini_for(&dir).replace("sell_signal = sell_at_rate", "sell_signal = sell_whenever");
        let file = write_temp_ini(&ini);
        let err = cli::run_dry_run(file.path(), None, &StrategyOverrides::default()).unwrap_err();
        assert!(matches!(err, SignalTraderError::UnknownSignal { .. }));
    }

    #[test]
    fn dry_run_bad_override_fails() {
        let dir = TempDir::new().unwrap();
        let file = write_temp_ini(&ini_for(&dir));
        let overrides = StrategyOverrides {
            buy_signal: Some("buy_at_noon".into()),
            ..StrategyOverrides::default()
        };
        let err = cli::run_dry_run(file.path(), Some("ALB"), &overrides).unwrap_err();
        assert!(matches!(err, SignalTraderError::UnknownSignal { name } if name == "buy_at_noon"));
    }
}

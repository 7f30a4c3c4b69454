//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{validate_backtest_config, validate_data_config};
use crate::domain::error::BacktestError;
use crate::domain::indicator::WarmupPolicy;
use crate::domain::report::BacktestReport;
use crate::domain::signal::SignalParams;
use crate::domain::universe::{load_universe, parse_instruments};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "fxbacktest", about = "EMA candlestick backtester for forex pairs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and write the JSON report
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Report destination; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import bars from a CSV file into the SQLite store
    Import {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        instrument: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// List instruments available from the configured data source
    ListInstruments {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest { config, output } => run_backtest(&config, output.as_ref()),
        Command::Import {
            config,
            instrument,
            file,
        } => run_import(&config, &instrument, &file),
        Command::ListInstruments { config } => run_list_instruments(&config),
        Command::Validate { config } => run_validate(&config),
        Command::Serve { config } => run_serve(&config),
    }
}

fn fail(err: &BacktestError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

/// Validate and load a config file in one step.
fn load_validated_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    eprintln!("Loading config from {}", path.display());
    let config = load_config(path)?;
    validate_backtest_config(&config).map_err(|e| fail(&e))?;
    validate_data_config(&config).map_err(|e| fail(&e))?;
    Ok(config)
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, BacktestError> {
    let defaults = BacktestConfig::default();

    let ema_span = config.get_int("backtest", "ema_span", defaults.ema_span as i64)?;
    let ema_span = usize::try_from(ema_span)
        .ok()
        .filter(|span| *span >= 1)
        .ok_or_else(|| BacktestError::ConfigInvalid {
            section: "backtest".into(),
            key: "ema_span".into(),
            reason: "ema_span must be at least 1".into(),
        })?;

    let warmup = match config.get_string("backtest", "warmup") {
        Some(s) => s
            .parse::<WarmupPolicy>()
            .map_err(|reason| BacktestError::ConfigInvalid {
                section: "backtest".into(),
                key: "warmup".into(),
                reason,
            })?,
        None => defaults.warmup,
    };

    let bt_config = BacktestConfig {
        initial_capital: config.get_double(
            "backtest",
            "initial_capital",
            defaults.initial_capital,
        )?,
        risk_fraction: config.get_double("backtest", "risk_fraction", defaults.risk_fraction)?,
        ema_span,
        warmup,
        signal: SignalParams {
            stop_loss_pct: config.get_double(
                "backtest",
                "stop_loss_pct",
                defaults.signal.stop_loss_pct,
            )?,
            target_pct: config.get_double("backtest", "target_pct", defaults.signal.target_pct)?,
        },
    };
    bt_config.validate()?;
    Ok(bt_config)
}

/// The optional `[backtest] instruments` allow-list. Absent or blank means
/// every instrument the data source knows about.
pub fn resolve_allow_list(config: &dyn ConfigPort) -> Result<Option<Vec<String>>, BacktestError> {
    match config.get_string("backtest", "instruments") {
        Some(s) if !s.trim().is_empty() => parse_instruments(&s)
            .map(Some)
            .map_err(|e| BacktestError::ConfigInvalid {
                section: "backtest".into(),
                key: "instruments".into(),
                reason: e.to_string(),
            }),
        _ => Ok(None),
    }
}

/// Open the data port named by `[data] source`.
pub fn open_data_port(
    config: &dyn ConfigPort,
) -> Result<Box<dyn DataPort + Send + Sync>, BacktestError> {
    let source = config.get_string_or("data", "source", "csv").trim().to_lowercase();

    match source.as_str() {
        "csv" => {
            let dir = config.get_string_or("data", "csv_dir", "data");
            Ok(Box::new(CsvAdapter::new(PathBuf::from(dir))))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            use crate::adapters::sqlite_adapter::SqliteAdapter;
            Ok(Box::new(SqliteAdapter::from_config(config)?))
        }
        other => Err(BacktestError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("data source '{other}' is not available in this build"),
        }),
    }
}

fn run_backtest(config_path: &PathBuf, output_path: Option<&PathBuf>) -> ExitCode {
    let config = match load_validated_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&config) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let allow_list = match resolve_allow_list(&config) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let data_port = match open_data_port(&config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    let output = output_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());

    run_backtest_pipeline(&*data_port, &bt_config, allow_list.as_deref(), &output)
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    bt_config: &BacktestConfig,
    allow_list: Option<&[String]>,
    output: &str,
) -> ExitCode {
    let universe = match load_universe(data_port, allow_list) {
        Ok(u) => u,
        Err(e) => return fail(&e),
    };
    for skipped in &universe.skipped {
        eprintln!("warning: skipping {} ({})", skipped.instrument, skipped.reason);
    }

    eprintln!(
        "Running backtest: {} instruments, EMA span {}, warm-up {}",
        universe.instruments.len(),
        bt_config.ema_span,
        bt_config.warmup,
    );

    let result = match backtest_engine::run_backtest(&universe.instruments, bt_config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    print_summary(&result);

    let report = BacktestReport::from(&result).with_skipped(&universe.skipped);
    match JsonReportAdapter.write(&report, output) {
        Ok(()) => {
            if output != "-" {
                eprintln!("\nReport written to: {output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn print_summary(result: &BacktestResult) {
    eprintln!("\n=== Aggregate Results ===");
    eprintln!("Initial Capital:  {:.2}", result.initial_capital);
    eprintln!("Final Capital:    {:.2}", result.final_capital);
    eprintln!("Total P/L:        {:.5}", result.total_profit_loss);
    eprintln!("Total Trades:     {}", result.total_trades());

    if !result.instruments.is_empty() {
        eprintln!("\n=== Per-Instrument Summary ===");
        for ir in &result.instruments {
            let pnl_sign = if ir.total_profit_loss >= 0.0 { "+" } else { "" };
            eprintln!(
                "  {}:  {} trades, {}{:.5}",
                ir.instrument,
                ir.total_trades(),
                pnl_sign,
                ir.total_profit_loss,
            );
        }
    }

    for rejected in &result.rejected {
        eprintln!("warning: {} rejected ({})", rejected.instrument, rejected.reason);
    }
}

fn run_import(config_path: &PathBuf, instrument: &str, file: &PathBuf) -> ExitCode {
    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::csv_adapter::read_bars;
        use crate::adapters::sqlite_adapter::SqliteAdapter;

        eprintln!("Loading config from {}", config_path.display());
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(code) => return code,
        };

        let store = match SqliteAdapter::from_config(&config) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };

        let instrument = instrument.trim().to_uppercase();
        let bars = match read_bars(file, &instrument) {
            Ok(b) => b,
            Err(e) => return fail(&e),
        };

        match store.insert_new_bars(&bars) {
            Ok(inserted) => {
                eprintln!(
                    "{}: {} bars read, {} new, {} already stored",
                    instrument,
                    bars.len(),
                    inserted,
                    bars.len() - inserted
                );
                println!("{inserted}");
                ExitCode::SUCCESS
            }
            Err(e) => fail(&e),
        }
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (config_path, instrument, file);
        eprintln!("error: sqlite feature is required for import");
        ExitCode::from(1)
    }
}

fn run_list_instruments(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let data_port = match open_data_port(&config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    let instruments = match data_port.list_instruments() {
        Ok(i) => i,
        Err(e) => return fail(&e),
    };

    if instruments.is_empty() {
        eprintln!("No instruments found");
    } else {
        for instrument in &instruments {
            println!("{}", instrument);
        }
        eprintln!("{} instruments found", instruments.len());
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let config = match load_validated_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&config) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let allow_list = match resolve_allow_list(&config) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };

    eprintln!("\nBacktest:");
    eprintln!("  initial_capital: {}", bt_config.initial_capital);
    eprintln!("  risk_fraction:   {}", bt_config.risk_fraction);
    eprintln!("  ema_span:        {}", bt_config.ema_span);
    eprintln!("  warmup:          {}", bt_config.warmup);
    eprintln!("  stop_loss_pct:   {}", bt_config.signal.stop_loss_pct);
    eprintln!("  target_pct:      {}", bt_config.signal.target_pct);
    match allow_list {
        Some(list) => eprintln!("  instruments:     {}", list.join(", ")),
        None => eprintln!("  instruments:     (all available)"),
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_serve(config_path: &PathBuf) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{build_router, AppState};
        use std::net::SocketAddr;
        use std::sync::Arc;

        const DEFAULT_LISTEN: &str = "127.0.0.1:8000";

        let config = match load_validated_config(config_path) {
            Ok(c) => c,
            Err(code) => return code,
        };

        let bt_config = match build_backtest_config(&config) {
            Ok(c) => c,
            Err(e) => return fail(&e),
        };
        let allow_list = match resolve_allow_list(&config) {
            Ok(a) => a,
            Err(e) => return fail(&e),
        };
        let data_port = match open_data_port(&config) {
            Ok(p) => Arc::from(p),
            Err(e) => return fail(&e),
        };

        let listen = config.get_string_or("web", "listen", DEFAULT_LISTEN);
        let addr: SocketAddr = match listen.parse() {
            Ok(a) => a,
            Err(_) => {
                return fail(&BacktestError::ConfigInvalid {
                    section: "web".into(),
                    key: "listen".into(),
                    reason: format!("invalid socket address '{listen}'"),
                });
            }
        };

        eprintln!("Starting web server on {}", addr);

        let router = build_router(AppState {
            data_port,
            config: bt_config,
            allow_list,
        });

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => return fail(&BacktestError::Io(e)),
        };

        let served = runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router).await
        });

        match served {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(&BacktestError::Io(e)),
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}

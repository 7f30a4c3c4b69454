//! Configuration validation.
//!
//! Validates all config fields before a backtest runs.

use crate::domain::error::BacktestError;
use crate::domain::indicator::WarmupPolicy;
use crate::domain::universe::parse_instruments;
use crate::ports::config_port::ConfigPort;

pub const DATA_SOURCES: &[&str] = &["csv", "sqlite"];

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    validate_initial_capital(config)?;
    validate_risk_fraction(config)?;
    validate_ema_span(config)?;
    validate_offset(config, "stop_loss_pct", 0.05)?;
    validate_offset(config, "target_pct", 0.15)?;
    validate_warmup(config)?;
    validate_instruments(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let source = config.get_string_or("data", "source", "csv").trim().to_lowercase();
    if !DATA_SOURCES.contains(&source.as_str()) {
        return Err(invalid(
            "data",
            "source",
            format!("unknown data source '{source}' (expected csv or sqlite)"),
        ));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> BacktestError {
    BacktestError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let value = config.get_double("backtest", "initial_capital", 100_000.0)?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_risk_fraction(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let value = config.get_double("backtest", "risk_fraction", 0.02)?;
    if !(value > 0.0 && value <= 1.0) {
        return Err(invalid(
            "backtest",
            "risk_fraction",
            "risk_fraction must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_ema_span(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let value = config.get_int("backtest", "ema_span", 5)?;
    if value < 1 {
        return Err(invalid("backtest", "ema_span", "ema_span must be at least 1"));
    }
    Ok(())
}

fn validate_offset(config: &dyn ConfigPort, key: &str, default: f64) -> Result<(), BacktestError> {
    let value = config.get_double("backtest", key, default)?;
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            key,
            format!("{key} must be in [0, 1)"),
        ));
    }
    Ok(())
}

fn validate_warmup(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    match config.get_string("backtest", "warmup") {
        Some(s) => s
            .parse::<WarmupPolicy>()
            .map(|_| ())
            .map_err(|reason| invalid("backtest", "warmup", reason)),
        None => Ok(()),
    }
}

fn validate_instruments(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    match config.get_string("backtest", "instruments") {
        Some(s) if !s.trim().is_empty() => parse_instruments(&s)
            .map(|_| ())
            .map_err(|e| invalid("backtest", "instruments", e.to_string())),
        _ => Ok(()),
    }
}

//! Backtest orchestration.
//!
//! Instruments are evaluated one after another in lexicographic order, all
//! sharing a single `CapitalLedger`. Within an instrument, every full 3-bar
//! window is scanned in time order and each emitted signal is sized against
//! the capital left by the previous trade, then booked before the next window.

use log::{debug, info, warn};

use super::error::{BacktestError, SeriesError};
use super::indicator::{annotate, WarmupPolicy};
use super::instrument_data::{evaluation_order, InstrumentData};
use super::ledger::CapitalLedger;
use super::ohlcv::validate_series;
use super::signal::{scan, SignalParams, WindowOutcome};
use super::sizing::size_signal;
use super::trade::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub risk_fraction: f64,
    pub ema_span: usize,
    pub warmup: WarmupPolicy,
    pub signal: SignalParams,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 100_000.0,
            risk_fraction: 0.02,
            ema_span: 5,
            warmup: WarmupPolicy::SeedFirst,
            signal: SignalParams::default(),
        }
    }
}

impl BacktestConfig {
    /// Reject parameters that would size positions nonsensically.
    pub fn validate(&self) -> Result<(), BacktestError> {
        let invalid = |key: &str, reason: &str| BacktestError::ConfigInvalid {
            section: "backtest".into(),
            key: key.into(),
            reason: reason.into(),
        };

        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(invalid("initial_capital", "initial_capital must be positive"));
        }
        if !(self.risk_fraction > 0.0 && self.risk_fraction <= 1.0) {
            return Err(invalid("risk_fraction", "risk_fraction must be in (0, 1]"));
        }
        if self.ema_span < 1 {
            return Err(invalid("ema_span", "ema_span must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.signal.stop_loss_pct) {
            return Err(invalid("stop_loss_pct", "stop_loss_pct must be in [0, 1)"));
        }
        if !(0.0..1.0).contains(&self.signal.target_pct) {
            return Err(invalid("target_pct", "target_pct must be in [0, 1)"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentResult {
    pub instrument: String,
    pub trades: Vec<Trade>,
    pub total_profit_loss: f64,
    /// Windows skipped because the previous bar had no EMA value.
    pub skipped_windows: usize,
}

impl InstrumentResult {
    pub fn total_trades(&self) -> usize {
        self.trades.len()
    }
}

/// An instrument refused before simulation; it never touches the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedInstrument {
    pub instrument: String,
    pub reason: SeriesError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_profit_loss: f64,
    pub instruments: Vec<InstrumentResult>,
    pub rejected: Vec<RejectedInstrument>,
}

impl BacktestResult {
    /// All trades in the order they were applied to the ledger.
    pub fn trades(&self) -> impl Iterator<Item = &Trade> {
        self.instruments.iter().flat_map(|r| r.trades.iter())
    }

    pub fn total_trades(&self) -> usize {
        self.instruments.iter().map(InstrumentResult::total_trades).sum()
    }
}

/// Run one instrument against the shared ledger.
///
/// The series must already satisfy `validate_series`.
pub fn run_instrument(
    data: &InstrumentData,
    config: &BacktestConfig,
    ledger: &mut CapitalLedger,
) -> InstrumentResult {
    let annotated = annotate(&data.bars, config.ema_span, config.warmup);

    let mut trades = Vec::new();
    let mut total_profit_loss = 0.0;
    let mut skipped_windows = 0;

    for outcome in scan(&annotated, &config.signal) {
        let signal = match outcome {
            WindowOutcome::Emit(signal) => signal,
            WindowOutcome::Skip => {
                skipped_windows += 1;
                continue;
            }
            WindowOutcome::NoSignal => continue,
        };

        let sizing = size_signal(&signal, ledger.capital(), config.risk_fraction);
        if sizing.is_degenerate() {
            debug!(
                "{}: stop equals entry at {}, booking a zero-size trade",
                data.instrument, signal.timestamp
            );
        }
        let capital_after = ledger.apply(sizing.realized_pnl);
        total_profit_loss += sizing.realized_pnl;

        debug!(
            "{} {} @ {} size={:.4} pnl={:.5} capital={:.2}",
            data.instrument,
            signal.side,
            signal.timestamp,
            sizing.position_size,
            sizing.realized_pnl,
            capital_after
        );

        trades.push(Trade::from_signal(
            &data.instrument,
            &signal,
            &sizing,
            capital_after,
        ));
    }

    InstrumentResult {
        instrument: data.instrument.clone(),
        trades,
        total_profit_loss,
        skipped_windows,
    }
}

pub fn run_backtest(
    instruments: &[InstrumentData],
    config: &BacktestConfig,
) -> Result<BacktestResult, BacktestError> {
    config.validate()?;
    if instruments.iter().all(InstrumentData::is_empty) {
        return Err(BacktestError::EmptyInput);
    }

    let mut ledger = CapitalLedger::new(config.initial_capital);
    let mut results = Vec::new();
    let mut rejected = Vec::new();
    let mut total_profit_loss = 0.0;

    for data in evaluation_order(instruments) {
        if data.is_empty() {
            debug!("{}: no bars, skipping", data.instrument);
            continue;
        }

        if let Err(reason) = validate_series(&data.bars) {
            warn!("{}: rejected ({})", data.instrument, reason);
            rejected.push(RejectedInstrument {
                instrument: data.instrument.clone(),
                reason,
            });
            continue;
        }

        let result = run_instrument(data, config, &mut ledger);
        info!(
            "{}: {} bars, {} trades, pnl {:.5}",
            data.instrument,
            data.bar_count(),
            result.total_trades(),
            result.total_profit_loss
        );
        if result.skipped_windows > 0 {
            debug!(
                "{}: {} windows skipped during indicator warm-up",
                data.instrument, result.skipped_windows
            );
        }

        total_profit_loss += result.total_profit_loss;
        results.push(result);
    }

    Ok(BacktestResult {
        initial_capital: ledger.initial_capital(),
        final_capital: ledger.capital(),
        total_profit_loss,
        instruments: results,
        rejected,
    })
}

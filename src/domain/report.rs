//! Serializable backtest report.
//!
//! Field names and rounding are what downstream consumers key off:
//! prices and P&L to 5 decimals, capital to 2, risk/reward to 2.
//! Rounding happens here only; the engine works at full precision.

use serde::Serialize;

use super::backtest::{BacktestResult, InstrumentResult, RejectedInstrument};
use super::trade::Trade;
use super::universe::SkippedInstrument;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const PRICE_DECIMALS: i32 = 5;
const CAPITAL_DECIMALS: i32 = 2;
const RATIO_DECIMALS: i32 = 2;

/// Round to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_profit_loss: f64,
    pub final_capital: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub instrument: String,
    pub side: String,
    pub timestamp: String,
    pub entry_price: f64,
    pub target: f64,
    pub stop_loss: f64,
    pub profit_loss: f64,
    pub risk_reward: Option<f64>,
    pub capital: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentReport {
    pub instrument: String,
    pub total_trades: usize,
    pub total_profit_loss: f64,
    pub signals: Vec<TradeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectionNote {
    pub instrument: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub summary: Summary,
    pub details: Vec<InstrumentReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectionNote>,
}

impl From<&Trade> for TradeRecord {
    fn from(trade: &Trade) -> Self {
        TradeRecord {
            instrument: trade.instrument.clone(),
            side: trade.side.to_string(),
            timestamp: trade.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            entry_price: round_to(trade.entry_price, PRICE_DECIMALS),
            target: round_to(trade.target, PRICE_DECIMALS),
            stop_loss: round_to(trade.stop_loss, PRICE_DECIMALS),
            profit_loss: round_to(trade.realized_pnl, PRICE_DECIMALS),
            risk_reward: trade.risk_reward.map(|rr| round_to(rr, RATIO_DECIMALS)),
            capital: round_to(trade.capital_after, CAPITAL_DECIMALS),
        }
    }
}

impl From<&InstrumentResult> for InstrumentReport {
    fn from(result: &InstrumentResult) -> Self {
        InstrumentReport {
            instrument: result.instrument.clone(),
            total_trades: result.total_trades(),
            total_profit_loss: round_to(result.total_profit_loss, PRICE_DECIMALS),
            signals: result.trades.iter().map(TradeRecord::from).collect(),
        }
    }
}

impl From<&RejectedInstrument> for RejectionNote {
    fn from(rejected: &RejectedInstrument) -> Self {
        RejectionNote {
            instrument: rejected.instrument.clone(),
            reason: rejected.reason.to_string(),
        }
    }
}

impl From<&BacktestResult> for BacktestReport {
    fn from(result: &BacktestResult) -> Self {
        BacktestReport {
            summary: Summary {
                total_profit_loss: round_to(result.total_profit_loss, PRICE_DECIMALS),
                final_capital: round_to(result.final_capital, CAPITAL_DECIMALS),
            },
            details: result.instruments.iter().map(InstrumentReport::from).collect(),
            rejected: result.rejected.iter().map(RejectionNote::from).collect(),
        }
    }
}

impl From<&SkippedInstrument> for RejectionNote {
    fn from(skipped: &SkippedInstrument) -> Self {
        RejectionNote {
            instrument: skipped.instrument.clone(),
            reason: format!("fetch failed: {}", skipped.reason),
        }
    }
}

impl BacktestReport {
    /// Add notes for instruments whose bars could not be loaded. Notes stay
    /// ordered by instrument.
    pub fn with_skipped(mut self, skipped: &[SkippedInstrument]) -> Self {
        self.rejected.extend(skipped.iter().map(RejectionNote::from));
        self.rejected
            .sort_by(|a, b| a.instrument.cmp(&b.instrument));
        self
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

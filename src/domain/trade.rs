//! Executed trade record.

use chrono::NaiveDateTime;

use super::signal::{Side, Signal};
use super::sizing::Sizing;

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub instrument: String,
    pub side: Side,
    pub timestamp: NaiveDateTime,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub risk_reward: Option<f64>,
    pub position_size: f64,
    pub realized_pnl: f64,
    pub capital_after: f64,
}

impl Trade {
    pub fn from_signal(
        instrument: &str,
        signal: &Signal,
        sizing: &Sizing,
        capital_after: f64,
    ) -> Self {
        Trade {
            instrument: instrument.to_string(),
            side: signal.side,
            timestamp: signal.timestamp,
            entry_price: signal.entry_price,
            stop_loss: signal.stop_loss,
            target: signal.target,
            risk_reward: sizing.risk_reward,
            position_size: sizing.position_size,
            realized_pnl: sizing.realized_pnl,
            capital_after,
        }
    }
}

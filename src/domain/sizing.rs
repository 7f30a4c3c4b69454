//! Fixed-fractional position sizing.
//!
//! risk_per_unit = |stop - entry|
//! position_size = capital * risk_fraction / risk_per_unit
//! realized_pnl  = position_size * profit_per_unit
//!
//! A zero risk distance yields a zero-size trade with no risk/reward ratio.

use super::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sizing {
    pub risk_per_unit: f64,
    pub risk_reward: Option<f64>,
    pub position_size: f64,
    pub realized_pnl: f64,
}

impl Sizing {
    pub fn is_degenerate(&self) -> bool {
        self.risk_reward.is_none()
    }
}

pub fn size_position(
    entry_price: f64,
    stop_loss: f64,
    profit_per_unit: f64,
    capital: f64,
    risk_fraction: f64,
) -> Sizing {
    let risk_per_unit = (stop_loss - entry_price).abs();

    if risk_per_unit == 0.0 {
        return Sizing {
            risk_per_unit,
            risk_reward: None,
            position_size: 0.0,
            realized_pnl: 0.0,
        };
    }

    let risk_amount = capital * risk_fraction;
    let position_size = risk_amount / risk_per_unit;

    Sizing {
        risk_per_unit,
        risk_reward: Some(profit_per_unit / risk_per_unit),
        position_size,
        realized_pnl: position_size * profit_per_unit,
    }
}

pub fn size_signal(signal: &Signal, capital: f64, risk_fraction: f64) -> Sizing {
    size_position(
        signal.entry_price,
        signal.stop_loss,
        signal.profit_per_unit,
        capital,
        risk_fraction,
    )
}

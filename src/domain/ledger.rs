//! Running capital balance for one backtest run.

#[derive(Debug, Clone, PartialEq)]
pub struct CapitalLedger {
    initial_capital: f64,
    capital: f64,
}

impl CapitalLedger {
    pub fn new(initial_capital: f64) -> Self {
        CapitalLedger {
            initial_capital,
            capital: initial_capital,
        }
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Book one trade's P&L and return the post-trade capital.
    pub fn apply(&mut self, realized_pnl: f64) -> f64 {
        self.capital += realized_pnl;
        self.capital
    }

    pub fn total_profit_loss(&self) -> f64 {
        self.capital - self.initial_capital
    }
}

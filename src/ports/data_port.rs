//! Bar source port trait.

use crate::domain::error::BacktestError;
use crate::domain::ohlcv::Bar;

pub trait DataPort {
    /// Identifiers of every instrument with stored bars, sorted.
    fn list_instruments(&self) -> Result<Vec<String>, BacktestError>;

    /// All bars for one instrument, ascending by timestamp.
    fn fetch_bars(&self, instrument: &str) -> Result<Vec<Bar>, BacktestError>;
}

//! Report sink port trait.

use crate::domain::error::BacktestError;
use crate::domain::report::BacktestReport;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(&self, report: &BacktestReport, output_path: &str) -> Result<(), BacktestError>;
}

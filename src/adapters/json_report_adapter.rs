//! JSON report writer.

use crate::domain::error::BacktestError;
use crate::domain::report::BacktestReport;
use crate::ports::report_port::ReportPort;
use std::fs;

/// Writes the report as pretty-printed JSON. An output path of `-` goes to stdout.
pub struct JsonReportAdapter;

impl ReportPort for JsonReportAdapter {
    fn write(&self, report: &BacktestReport, output_path: &str) -> Result<(), BacktestError> {
        let json = report.to_json_pretty()?;
        if output_path == "-" {
            println!("{json}");
        } else {
            fs::write(output_path, json + "\n")?;
        }
        Ok(())
    }
}

//! CSV file data adapter.
//!
//! One `<INSTRUMENT>.csv` per instrument under a base directory, with a header
//! row and columns `timestamp,open,high,low,close[,volume]`.

use crate::domain::error::BacktestError;
use crate::domain::ohlcv::{parse_timestamp, Bar};
use crate::ports::data_port::DataPort;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, instrument: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", instrument))
    }
}

fn format_error(path: &Path, reason: impl Into<String>) -> BacktestError {
    BacktestError::DataFormat {
        source_name: path.display().to_string(),
        reason: reason.into(),
    }
}

fn parse_price(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    path: &Path,
    line: u64,
) -> Result<f64, BacktestError> {
    record
        .get(index)
        .ok_or_else(|| format_error(path, format!("line {line}: missing {name} column")))?
        .trim()
        .parse()
        .map_err(|e| format_error(path, format!("line {line}: invalid {name} value: {e}")))
}

/// Read every bar from one CSV file, sorted by timestamp.
///
/// A missing or empty volume column reads as 0.
pub fn read_bars(path: &Path, instrument: &str) -> Result<Vec<Bar>, BacktestError> {
    let content = fs::read_to_string(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| format_error(path, format!("CSV parse error: {e}")))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let ts_str = record
            .get(0)
            .ok_or_else(|| format_error(path, format!("line {line}: missing timestamp column")))?;
        let timestamp = parse_timestamp(ts_str).ok_or_else(|| {
            format_error(path, format!("line {line}: invalid timestamp '{ts_str}'"))
        })?;

        let volume = match record.get(5).map(str::trim) {
            None | Some("") => 0.0,
            Some(_) => parse_price(&record, 5, "volume", path, line)?,
        };

        bars.push(Bar {
            instrument: instrument.to_string(),
            timestamp,
            open: parse_price(&record, 1, "open", path, line)?,
            high: parse_price(&record, 2, "high", path, line)?,
            low: parse_price(&record, 3, "low", path, line)?,
            close: parse_price(&record, 4, "close", path, line)?,
            volume,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

impl DataPort for CsvAdapter {
    fn list_instruments(&self) -> Result<Vec<String>, BacktestError> {
        let mut instruments = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                instruments.push(stem.to_string());
            }
        }

        instruments.sort();
        Ok(instruments)
    }

    fn fetch_bars(&self, instrument: &str) -> Result<Vec<Bar>, BacktestError> {
        read_bars(&self.csv_path(instrument), instrument)
    }
}

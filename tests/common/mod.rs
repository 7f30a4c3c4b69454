#![allow(dead_code)]

use chrono::NaiveDate;
use fxbacktest::domain::error::BacktestError;
pub use fxbacktest::domain::ohlcv::Bar;
use fxbacktest::ports::data_port::DataPort;
use std::collections::BTreeMap;

pub struct MockDataPort {
    pub data: BTreeMap<String, Vec<Bar>>,
    pub errors: BTreeMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn with_bars(mut self, instrument: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(instrument.to_string(), bars);
        self
    }

    pub fn with_error(mut self, instrument: &str, reason: &str) -> Self {
        self.errors.insert(instrument.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn list_instruments(&self) -> Result<Vec<String>, BacktestError> {
        let mut instruments: Vec<String> = self
            .data
            .keys()
            .chain(self.errors.keys())
            .cloned()
            .collect();
        instruments.sort();
        instruments.dedup();
        Ok(instruments)
    }

    fn fetch_bars(&self, instrument: &str) -> Result<Vec<Bar>, BacktestError> {
        if let Some(reason) = self.errors.get(instrument) {
            return Err(BacktestError::Database {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(instrument).cloned().unwrap_or_default())
    }
}

pub fn make_bar(instrument: &str, hour: u32, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar {
        instrument: instrument.to_string(),
        timestamp: NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap(),
        open,
        high,
        low,
        close,
        volume: 0.0,
    }
}

/// One BUY: bar 0 sits wholly above its EMA and bar 2 is bullish, so the
/// trade enters at 1.08 with stop 1.026 and target 1.242 (reward:risk 3).
pub fn buy_series(instrument: &str) -> Vec<Bar> {
    vec![
        make_bar(instrument, 0, 1.105, 1.11, 1.101, 1.10),
        make_bar(instrument, 1, 1.10, 1.12, 1.10, 1.11),
        make_bar(instrument, 2, 1.08, 1.10, 1.08, 1.09),
        make_bar(instrument, 3, 1.12, 1.12, 1.12, 1.12),
        make_bar(instrument, 4, 1.13, 1.13, 1.13, 1.13),
    ]
}

/// One SELL: bar 0 sits wholly below its EMA and bar 2 is bearish, so the
/// trade enters at 1.12 with stop 1.176 and target 0.952.
pub fn sell_series(instrument: &str) -> Vec<Bar> {
    vec![
        make_bar(instrument, 0, 1.095, 1.099, 1.09, 1.10),
        make_bar(instrument, 1, 1.10, 1.11, 1.09, 1.10),
        make_bar(instrument, 2, 1.12, 1.12, 1.11, 1.11),
    ]
}

/// Bars that never trigger a signal.
pub fn flat_series(instrument: &str, len: u32) -> Vec<Bar> {
    (0..len)
        .map(|h| make_bar(instrument, h, 1.0, 1.0, 1.0, 1.0))
        .collect()
}

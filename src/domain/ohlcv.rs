//! OHLC bar representation and series preconditions.

use chrono::{NaiveDate, NaiveDateTime};

use super::error::SeriesError;

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub instrument: String,
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// close > open
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// close < open
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Parse a bar timestamp. Date-only values map to midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Check that a series is strictly ascending by timestamp with finite,
/// strictly positive prices and a finite, non-negative volume.
pub fn validate_series(bars: &[Bar]) -> Result<(), SeriesError> {
    for (index, bar) in bars.iter().enumerate() {
        let prices = [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ];
        if let Some((field, _)) = prices.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SeriesError::NonFinitePrice { index, field });
        }
        if let Some((field, _)) = prices.iter().find(|(_, v)| *v <= 0.0) {
            return Err(SeriesError::NonPositivePrice { index, field });
        }
        if !bar.volume.is_finite() || bar.volume < 0.0 {
            return Err(SeriesError::InvalidVolume {
                index,
                volume: bar.volume,
            });
        }
        if index > 0 {
            let previous = bars[index - 1].timestamp;
            if bar.timestamp <= previous {
                return Err(SeriesError::NonIncreasingTimestamp {
                    index,
                    previous,
                    timestamp: bar.timestamp,
                });
            }
        }
    }
    Ok(())
}

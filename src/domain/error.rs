//! Domain error types.

use chrono::NaiveDateTime;

/// Why an instrument's bar series was refused before simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("timestamp {timestamp} at bar {index} does not follow {previous}")]
    NonIncreasingTimestamp {
        index: usize,
        previous: NaiveDateTime,
        timestamp: NaiveDateTime,
    },

    #[error("non-finite {field} at bar {index}")]
    NonFinitePrice { index: usize, field: &'static str },

    #[error("non-positive {field} at bar {index}")]
    NonPositivePrice { index: usize, field: &'static str },

    #[error("invalid volume {volume} at bar {index}")]
    InvalidVolume { index: usize, volume: f64 },
}

/// Top-level error type for fxbacktest.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("no market data available to backtest")]
    EmptyInput,

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("malformed data in {source_name}: {reason}")]
    DataFormat { source_name: String, reason: String },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        let code: u8 = match err {
            BacktestError::Io(_) | BacktestError::Serialize(_) => 1,
            BacktestError::ConfigParse { .. }
            | BacktestError::ConfigMissing { .. }
            | BacktestError::ConfigInvalid { .. } => 2,
            BacktestError::Database { .. } | BacktestError::DatabaseQuery { .. } => 3,
            BacktestError::DataFormat { .. } => 4,
            BacktestError::EmptyInput => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_input_message() {
        assert_eq!(
            BacktestError::EmptyInput.to_string(),
            "no market data available to backtest"
        );
    }

    #[test]
    fn config_invalid_message_names_key() {
        let err = BacktestError::ConfigInvalid {
            section: "backtest".into(),
            key: "risk_fraction".into(),
            reason: "must be in (0, 1]".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [backtest] risk_fraction: must be in (0, 1]"
        );
    }

    #[test]
    fn series_error_reports_both_timestamps() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let err = SeriesError::NonIncreasingTimestamp {
            index: 3,
            previous: ts,
            timestamp: ts,
        };
        let msg = err.to_string();
        assert!(msg.contains("bar 3"));
        assert!(msg.contains("2024-03-01 10:00:00"));
    }
}

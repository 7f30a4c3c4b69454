//! Configuration access port trait.
//!
//! Sections and keys are INI-style. Numeric getters return `default` when the
//! key is absent and `ConfigInvalid` when it is present but does not parse.

use crate::domain::error::BacktestError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_string_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get_string(section, key)
            .unwrap_or_else(|| default.to_string())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, BacktestError> {
        match self.get_string(section, key) {
            Some(raw) => raw.trim().parse().map_err(|_| BacktestError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("'{raw}' is not an integer"),
            }),
            None => Ok(default),
        }
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, BacktestError> {
        match self.get_string(section, key) {
            Some(raw) => raw.trim().parse().map_err(|_| BacktestError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("'{raw}' is not a number"),
            }),
            None => Ok(default),
        }
    }
}

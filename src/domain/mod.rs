//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod signal;
pub mod sizing;
pub mod ledger;
pub mod trade;
pub mod instrument_data;
pub mod backtest;
pub mod report;
pub mod config_validation;
pub mod universe;
pub mod error;

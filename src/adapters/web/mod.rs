//! Web server adapter.
//!
//! Serves the backtest report as JSON over Axum. Each request loads the
//! universe from the data port and runs a fresh backtest to completion.

mod error;
mod handlers;

pub use error::WebError;
pub use handlers::*;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::domain::backtest::BacktestConfig;
use crate::ports::data_port::DataPort;

pub struct AppState {
    pub data_port: Arc<dyn DataPort + Send + Sync>,
    pub config: BacktestConfig,
    pub allow_list: Option<Vec<String>>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/backtest", get(handlers::backtest))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}

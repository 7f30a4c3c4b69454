//! HTTP request handlers for web adapter.

use axum::{extract::State, Json};
use log::info;
use std::sync::Arc;

use crate::domain::backtest::run_backtest;
use crate::domain::report::BacktestReport;
use crate::domain::universe::load_universe;

use super::{AppState, WebError};

pub async fn backtest(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BacktestReport>, WebError> {
    let universe = load_universe(&*state.data_port, state.allow_list.as_deref())?;
    let result = run_backtest(&universe.instruments, &state.config)?;
    info!(
        "web backtest: {} instruments, {} trades",
        result.instruments.len(),
        result.total_trades()
    );
    Ok(Json(BacktestReport::from(&result).with_skipped(&universe.skipped)))
}

pub async fn not_found() -> WebError {
    WebError::not_found("Page not found")
}

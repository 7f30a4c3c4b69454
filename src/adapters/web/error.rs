//! HTTP error responses for web adapter.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::error::BacktestError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

pub fn status_from_error(err: &BacktestError) -> StatusCode {
    match err {
        BacktestError::EmptyInput => StatusCode::NOT_FOUND,
        BacktestError::ConfigMissing { .. }
        | BacktestError::ConfigInvalid { .. }
        | BacktestError::ConfigParse { .. } => StatusCode::BAD_REQUEST,
        BacktestError::DataFormat { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        BacktestError::Database { .. }
        | BacktestError::DatabaseQuery { .. }
        | BacktestError::Serialize(_)
        | BacktestError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<BacktestError> for WebError {
    fn from(err: BacktestError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

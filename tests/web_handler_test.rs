#![cfg(feature = "web")]
//! Web handler integration tests for the JSON backtest endpoint.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use fxbacktest::adapters::web::{build_router, AppState};
use fxbacktest::domain::backtest::BacktestConfig;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use common::*;

fn create_test_app(port: MockDataPort, allow_list: Option<Vec<String>>) -> Router {
    build_router(AppState {
        data_port: Arc::new(port),
        config: BacktestConfig::default(),
        allow_list,
    })
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/json"), "{content_type}");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn backtest_returns_report() {
    let port = MockDataPort::new()
        .with_bars("EURUSD", buy_series("EURUSD"))
        .with_bars("GBPUSD", sell_series("GBPUSD"));
    let (status, json) = get_json(create_test_app(port, None), "/backtest").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["details"].as_array().unwrap().len(), 2);
    assert_eq!(json["details"][0]["signals"][0]["side"], "BUY");
    assert_eq!(json["details"][1]["signals"][0]["side"], "SELL");
    assert_eq!(json["summary"]["final_capital"], 112_360.0);
}

#[tokio::test]
async fn backtest_honours_allow_list() {
    let port = MockDataPort::new()
        .with_bars("EURUSD", buy_series("EURUSD"))
        .with_bars("GBPUSD", buy_series("GBPUSD"));
    let app = create_test_app(port, Some(vec!["EURUSD".to_string()]));
    let (status, json) = get_json(app, "/backtest").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["details"].as_array().unwrap().len(), 1);
    assert_eq!(json["summary"]["final_capital"], 106_000.0);
}

#[tokio::test]
async fn empty_store_is_not_found() {
    let (status, json) = get_json(create_test_app(MockDataPort::new(), None), "/backtest").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "no market data available to backtest");
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let (status, json) = get_json(create_test_app(MockDataPort::new(), None), "/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn fetch_failures_are_listed_in_report() {
    let port = MockDataPort::new()
        .with_bars("EURUSD", buy_series("EURUSD"))
        .with_error("XAUUSD", "connection reset");
    let (status, json) = get_json(create_test_app(port, None), "/backtest").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rejected"][0]["instrument"], "XAUUSD");
}

#[tokio::test]
async fn all_fetches_failing_is_a_server_error() {
    let port = MockDataPort::new().with_error("XAUUSD", "connection reset");
    let (status, json) = get_json(create_test_app(port, None), "/backtest").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("connection reset"));
}

mod common;

use axum::http::StatusCode;
use common::{FailingClickRepository, TestAppBuilder, test_app};
use serde_json::Value;
use std::sync::Arc;

#[tokio::test]
async fn test_health_all_stores_ok() {
    let app = test_app();

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["checks"]["linkStore"]["status"], "ok");
    assert_eq!(body["checks"]["clickStore"]["status"], "ok");
    assert_eq!(body["checks"]["fallbackStore"]["status"], "ok");
}

#[tokio::test]
async fn test_health_degraded_when_click_store_down() {
    let app = TestAppBuilder::new()
        .primary(Arc::new(FailingClickRepository))
        .build();

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["clickStore"]["status"], "error");
    assert_eq!(body["checks"]["fallbackStore"]["status"], "ok");
}

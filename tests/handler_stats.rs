mod common;

use axum::http::StatusCode;
use chrono::{Days, Utc};
use common::test_app;
use serde_json::Value;

#[tokio::test]
async fn test_stats_include_zero_rows_sorted_by_clicks() {
    let app = test_app();
    let quiet = app.create_link("https://example.com/quiet").await;
    let busy = app.create_link("https://example.com/busy").await;

    let busy_code = busy["shortCode"].as_str().unwrap();
    app.visit(busy_code).await;
    app.visit(busy_code).await;

    let response = app.server.get("/api/click-stats").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let stats = body["stats"].as_array().unwrap();
    assert_eq!(stats.len(), 2);

    assert_eq!(stats[0]["shortCode"], busy_code);
    assert_eq!(stats[0]["totalClicks"], 2);
    assert_eq!(stats[0]["targetUrl"], "https://example.com/busy");
    assert!(stats[0]["lastClickAt"].is_string());

    assert_eq!(stats[1]["shortCode"], quiet["shortCode"]);
    assert_eq!(stats[1]["totalClicks"], 0);
    assert_eq!(stats[1]["avgClicksPerDay"], 0.0);
    assert_eq!(stats[1]["source"], "none");
    assert!(stats[1]["lastClickAt"].is_null());
    assert!(stats[1].get("recentClicks").is_none());

    assert_eq!(body["meta"]["totalLinks"], 2);
    assert_eq!(body["meta"]["totalClicks"], 2);
    assert_eq!(body["meta"]["degraded"], false);
    assert_eq!(body["meta"]["primaryAvailable"], true);
    assert_eq!(body["meta"]["linkStoreAvailable"], true);
}

#[tokio::test]
async fn test_stats_recent_clicks() {
    let app = test_app();
    let link = app.create_link("https://example.com/recent").await;
    let code = link["shortCode"].as_str().unwrap();
    for _ in 0..3 {
        app.visit(code).await;
    }

    let body: Value = app
        .server
        .get("/api/click-stats")
        .add_query_param("recent", 2)
        .await
        .json();

    let recent = body["stats"][0]["recentClicks"].as_array().unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0]["shortCode"], code);
}

#[tokio::test]
async fn test_stats_date_filter() {
    let app = test_app();
    let link = app.create_link("https://example.com/dated").await;
    let code = link["shortCode"].as_str().unwrap();
    app.visit(code).await;

    let today = Utc::now().date_naive();
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap();

    let body: Value = app
        .server
        .get("/api/click-stats")
        .add_query_param("dateFrom", today.to_string())
        .add_query_param("dateTo", today.to_string())
        .await
        .json();
    assert_eq!(body["stats"][0]["totalClicks"], 1);
    assert_eq!(body["meta"]["dateFrom"], today.to_string());

    let body: Value = app
        .server
        .get("/api/click-stats")
        .add_query_param("dateTo", yesterday.to_string())
        .await
        .json();
    assert_eq!(body["stats"][0]["shortCode"], code);
    assert_eq!(body["stats"][0]["totalClicks"], 0);
}

#[tokio::test]
async fn test_stats_rejects_bad_parameters() {
    let app = test_app();

    let cases: [(&str, &str); 3] = [
        ("dateFrom", "last-week"),
        ("recent", "51"),
        ("recent", "-1"),
    ];
    for (key, value) in cases {
        let response = app
            .server
            .get("/api/click-stats")
            .add_query_param(key, value)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{key}={value}");
    }

    let response = app
        .server
        .get("/api/click-stats")
        .add_query_param("dateFrom", "2026-02-10")
        .add_query_param("dateTo", "2026-02-01")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
}

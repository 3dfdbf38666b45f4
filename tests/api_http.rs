// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /score (+ offset-less enquiry dates, 400 JSON on bad bodies and
//   far-future enquiry dates)
// - POST /score/batch
// - POST /actions/bulk
// - GET /config
// - POST /admin/reload-config (missing file keeps the old snapshot)

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::json;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use lead_intent_scorer::api::{self, AppState};
use lead_intent_scorer::{ConfigHandle, ScoringConfig};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Build the same Router the binary uses, on the built-in config.
fn test_router() -> Router {
    let handle = ConfigHandle::new(ScoringConfig::default_seed());
    api::router(AppState::new(handle, "config/scoring.toml"))
}

async fn send(app: Router, method: &str, uri: &str, payload: Option<Json>) -> (StatusCode, Json) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match payload {
        Some(p) => {
            req = req.header("content-type", "application/json");
            Body::from(p.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .oneshot(req.body(body).expect("build request"))
        .await
        .expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "OK");
}

#[tokio::test]
async fn api_score_returns_explained_outcome() {
    let lead = json!({
        "email": "john@example.com",
        "name": "John Doe",
        "demo_requested": true,
        "pricing_compared": true,
        "enquiry_call_whatsapp": true,
        "lead_through_referral": true,
        "registration": true,
        "lead_through_call": true,
        "enquiry_date": Utc::now().to_rfc3339(),
    });
    let (status, v) = send(test_router(), "POST", "/score", Some(lead)).await;
    assert_eq!(status, StatusCode::OK, "body: {v}");

    // Contract checks for UI consumers
    assert_eq!(v["intent_level"], "High");
    assert_eq!(v["action"]["urgency"], "Immediate");
    assert_eq!(v["band"]["label"], "Hot");
    assert_eq!(v["contributions"].as_array().unwrap().len(), 5);
    assert_eq!(v["all_contributions"].as_array().unwrap().len(), 7);
    assert_eq!(v["contributions"][0]["feature"], "demo_requested");
    assert!(v["score"].as_f64().unwrap() <= 100.0);
    assert!(v["summary"].as_str().unwrap().contains("demo_requested"));
}

#[tokio::test]
async fn api_score_accepts_enquiry_date_without_offset() {
    let lead = json!({
        "email": "john@example.com",
        "name": "John Doe",
        "company": "Acme Corp",
        "demo_requested": true,
        "registration": true,
        "enquiry_call_whatsapp": false,
        "enquiry_date": "2024-02-20T10:00:00",
        "pricing_compared": true,
        "lead_through_events": false,
        "lead_through_call": true,
        "lead_through_referral": false
    });
    let (status, v) = send(test_router(), "POST", "/score", Some(lead)).await;
    assert_eq!(status, StatusCode::OK, "body: {v}");
    // (25 + 15 + 18 + 12) / 120, enquiry long past the decay window
    assert!((v["score"].as_f64().unwrap() - 70.0 / 120.0 * 100.0).abs() < 1e-9);
    assert_eq!(v["intent_level"], "Low");
}

#[tokio::test]
async fn api_malformed_body_is_400_json() {
    let lead = json!({ "demo_requested": true, "enquiry_date": "sometime soon" });
    let (status, v) = send(test_router(), "POST", "/score", Some(lead)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["kind"], "invalid_input");
    assert!(v["error"].as_str().unwrap().contains("enquiry_date"));

    let (status, v) = send(test_router(), "POST", "/actions/bulk", Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["kind"], "invalid_input");
}

#[tokio::test]
async fn api_score_rejects_far_future_enquiry_with_400() {
    let lead = json!({
        "demo_requested": true,
        "enquiry_date": (Utc::now() + Duration::days(3)).to_rfc3339(),
    });
    let (status, v) = send(test_router(), "POST", "/score", Some(lead)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["kind"], "invalid_input");
    assert!(v["error"].as_str().unwrap().contains("future"));
}

#[tokio::test]
async fn api_batch_scores_and_summarizes() {
    let leads = json!([
        { "demo_requested": true, "pricing_compared": true, "enquiry_call_whatsapp": true,
          "lead_through_referral": true, "registration": true },
        { "registration": true },
        {}
    ]);
    let (status, v) = send(test_router(), "POST", "/score/batch", Some(leads)).await;
    assert_eq!(status, StatusCode::OK, "body: {v}");
    assert_eq!(v["outcomes"].as_array().unwrap().len(), 3);
    assert_eq!(v["summary"]["total_leads"], 3);
    assert_eq!(v["summary"]["high_intent_count"], 1);
    assert_eq!(v["summary"]["source_breakdown"]["registration"], 2);
}

#[tokio::test]
async fn api_bulk_actions_keyed_by_lead() {
    let scores = json!({ "a": 91.0, "b": 45.0, "c": 5.0 });
    let (status, v) = send(test_router(), "POST", "/actions/bulk", Some(scores)).await;
    assert_eq!(status, StatusCode::OK, "body: {v}");
    assert_eq!(v["a"]["urgency"], "Immediate");
    assert_eq!(v["b"]["urgency"], "Medium");
    assert_eq!(v["c"]["action"], "Automated drip campaign");
    assert_eq!(v["b"]["bracket"], "40-60");

    let bad = json!({ "x": 180.0 });
    let (status, v) = send(test_router(), "POST", "/actions/bulk", Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["kind"], "invalid_input");
}

#[tokio::test]
async fn api_config_exposes_active_snapshot() {
    let (status, v) = send(test_router(), "GET", "/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["version"], 1);
    assert_eq!(v["total_possible"], 120.0);
    assert_eq!(v["signals"].as_object().unwrap().len(), 7);
    assert_eq!(v["brackets"].as_array().unwrap().len(), 4);
    assert_eq!(v["bands"].as_array().unwrap().len(), 4);
    assert_eq!(v["bands"][3]["label"], "Hot");
}

#[tokio::test]
async fn api_reload_with_missing_file_keeps_previous_config() {
    let handle = ConfigHandle::new(ScoringConfig::default_seed());
    let app = api::router(AppState::new(handle.clone(), "does/not/exist.toml"));

    let (status, v) = send(app, "POST", "/admin/reload-config", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(v["kind"], "config_error");
    assert_eq!(handle.version(), 1);
}

#[tokio::test]
async fn api_reload_from_shipped_file_bumps_version() {
    let handle = ConfigHandle::new(ScoringConfig::default_seed());
    let app = api::router(AppState::new(handle.clone(), "config/scoring.toml"));

    let (status, v) = send(app, "POST", "/admin/reload-config", None).await;
    assert_eq!(status, StatusCode::OK, "body: {v}");
    assert_eq!(v["version"], 2);
    assert_eq!(handle.version(), 2);
}

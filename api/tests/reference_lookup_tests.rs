// tests/reference_lookup_tests.rs
//
// Exercises the HTTP reference lookup against a throwaway reference-data
// server bound to an ephemeral port.

use api::observability::Observability;
use api::reference::{CachedReferenceLookup, HttpReferenceLookup, LookupError, ReferenceLookup};
use api::routes;
use api::state::AppState;
use axum::body::{to_bytes, Body};
use axum::extract::Query;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use shared::{ReferenceCategory, ValidationSettings};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;

async fn divisions(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    match params.get("division_name").map(String::as_str) {
        Some("Finance") => Json(json!([{ "id": 1, "division_name": "Finance" }])),
        Some("Slow") => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!([{ "id": 2, "division_name": "Slow" }]))
        }
        _ => Json(json!([])),
    }
}

async fn states(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("state_name").map(String::as_str) {
        Some("Kerala") => Json(json!([{ "id": 1, "state_name": "Kerala" }])).into_response(),
        Some("Goa") => Json(json!({ "count": 1 })).into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn spawn_reference_server() -> String {
    let app = Router::new()
        .route("/divisions", get(divisions))
        .route("/states", get(states));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

#[tokio::test]
async fn test_http_lookup_found_and_missing() {
    let base_url = spawn_reference_server().await;
    let lookup = HttpReferenceLookup::new(base_url, Duration::from_secs(2));

    assert!(lookup.exists(ReferenceCategory::Division, "Finance").await.unwrap());
    assert!(!lookup.exists(ReferenceCategory::Division, "Legal").await.unwrap());
    assert!(lookup.exists(ReferenceCategory::State, "Kerala").await.unwrap());
}

#[tokio::test]
async fn test_http_lookup_error_status() {
    let base_url = spawn_reference_server().await;
    let lookup = HttpReferenceLookup::new(base_url, Duration::from_secs(2));

    let err = lookup.exists(ReferenceCategory::State, "Atlantis").await.unwrap_err();
    assert_eq!(err, LookupError::Status(500));
}

#[tokio::test]
async fn test_http_lookup_times_out() {
    let base_url = spawn_reference_server().await;
    let lookup = HttpReferenceLookup::new(base_url, Duration::from_secs(1));

    let started = Instant::now();
    let err = lookup.exists(ReferenceCategory::Division, "Slow").await.unwrap_err();
    assert_eq!(err, LookupError::Timeout);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_http_lookup_rejects_non_array_body() {
    let base_url = spawn_reference_server().await;
    let lookup = HttpReferenceLookup::new(base_url, Duration::from_secs(2));

    let err = lookup.exists(ReferenceCategory::State, "Goa").await.unwrap_err();
    assert!(
        matches!(&err, LookupError::InvalidResponse(detail) if detail.starts_with("expected a JSON array")),
        "unexpected error: {:?}",
        err
    );
}

#[tokio::test]
async fn test_cached_lookup_over_http() {
    let base_url = spawn_reference_server().await;
    let http: Arc<dyn ReferenceLookup> =
        Arc::new(HttpReferenceLookup::new(base_url, Duration::from_secs(2)));
    let cached = CachedReferenceLookup::new(http, Duration::from_secs(60), 100);

    assert!(cached.exists(ReferenceCategory::Division, "Finance").await.unwrap());
    assert!(cached.exists(ReferenceCategory::Division, "Finance").await.unwrap());
    assert!(!cached.exists(ReferenceCategory::Division, "Legal").await.unwrap());
}

async fn put_other(base_url: String, body: Value) -> (StatusCode, String) {
    let lookup = Arc::new(HttpReferenceLookup::new(base_url, Duration::from_secs(1)));
    let registry = Observability::registry("test").unwrap();
    let app = routes::app(AppState::new(&ValidationSettings::default(), lookup, registry));

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/applications/11/other")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_slow_reference_service_fails_closed() {
    let base_url = spawn_reference_server().await;
    let (status, body) = put_other(
        base_url,
        json!({
            "division_name": "Slow",
            "meal_preferences": "VEG",
            "place_of_work": "Pune",
            "state_name": "Kerala"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Division name: Invalid value");
}

#[tokio::test]
async fn test_non_array_reference_body_fails_closed() {
    let base_url = spawn_reference_server().await;
    let (status, body) = put_other(
        base_url,
        json!({
            "division_name": "Finance",
            "meal_preferences": "VEG",
            "place_of_work": "Pune",
            "state_name": "Goa"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "State name: Invalid value");
}

//! Router-level tests for the REST surface.

#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use quakehub::api;
use quakehub::app_state::AppState;
use quakehub::domain::EventBus;
use quakehub::feed::FeedClient;
use quakehub::persistence::Store;
use quakehub::service::IngestService;
use tower::ServiceExt;

async fn app() -> Router {
    let Ok(feed) = FeedClient::new(Duration::from_secs(5)) else {
        panic!("client build failed");
    };
    let Ok(store) = Store::memory().await else {
        panic!("memory store failed");
    };
    let event_bus = EventBus::new(100);
    let ingest = Arc::new(IngestService::new(feed, store.clone(), event_bus.clone()));

    api::build_router(None).with_state(AppState {
        ingest,
        store,
        event_bus,
    })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let Ok(collected) = response.into_body().collect().await else {
        panic!("body read failed");
    };
    let Ok(value) = serde_json::from_slice(&collected.to_bytes()) else {
        panic!("body was not JSON");
    };
    value
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    let Ok(request) = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
    else {
        panic!("request build failed");
    };
    request
}

fn get(uri: &str) -> Request<Body> {
    let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
        panic!("request build failed");
    };
    request
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = app().await;
    let Ok(response) = app.oneshot(get("/health")).await else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("healthy"));
}

#[tokio::test]
async fn create_and_list_rules_via_forms() {
    let app = app().await;

    let Ok(response) = app
        .clone()
        .oneshot(form_post(
            "/rules",
            "name=CA+3%2B&min_mag=3.0&bbox=-125%2C32%2C-114%2C42",
        ))
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let Some(id) = created.get("created").and_then(serde_json::Value::as_i64) else {
        panic!("missing created id: {created}");
    };
    assert!(id > 0);

    let Ok(response) = app.oneshot(get("/rules")).await else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);
    let rules = body_json(response).await;
    let Some(first) = rules.as_array().and_then(|a| a.first()) else {
        panic!("expected one rule: {rules}");
    };
    assert_eq!(first.get("name").and_then(|v| v.as_str()), Some("CA 3+"));
    assert_eq!(
        first.get("bbox").and_then(|v| v.as_str()),
        Some("-125,32,-114,42")
    );
}

#[tokio::test]
async fn invalid_bbox_is_rejected() {
    let app = app().await;
    let Ok(response) = app
        .oneshot(form_post("/rules", "name=bad&min_mag=1.0&bbox=not-a-box"))
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json.pointer("/error/code").and_then(serde_json::Value::as_u64),
        Some(1001)
    );
}

#[tokio::test]
async fn delete_rule_then_404_on_retry() {
    let app = app().await;
    let Ok(response) = app
        .clone()
        .oneshot(form_post("/rules", "name=gone&min_mag=1.0"))
        .await
    else {
        panic!("request failed");
    };
    let created = body_json(response).await;
    let Some(id) = created.get("created").and_then(serde_json::Value::as_i64) else {
        panic!("missing created id");
    };

    let Ok(delete) = Request::builder()
        .method("DELETE")
        .uri(format!("/rules/{id}"))
        .body(Body::empty())
    else {
        panic!("request build failed");
    };
    let Ok(response) = app.clone().oneshot(delete).await else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let Ok(delete_again) = Request::builder()
        .method("DELETE")
        .uri(format!("/rules/{id}"))
        .body(Body::empty())
    else {
        panic!("request build failed");
    };
    let Ok(response) = app.oneshot(delete_again).await else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_appears_in_tail() {
    let app = app().await;
    let Ok(response) = app
        .clone()
        .oneshot(form_post("/events/test", ""))
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);

    let Ok(response) = app.oneshot(get("/events/tail?n=5")).await else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);
    let tail = body_json(response).await;
    let Some(last) = tail.as_array().and_then(|a| a.last()) else {
        panic!("expected one notification: {tail}");
    };
    assert_eq!(last.get("type").and_then(|v| v.as_str()), Some("TestEvent"));
    assert!(last.get("ts_ms").is_some());
}

#[tokio::test]
async fn empty_store_serves_empty_collections() {
    let app = app().await;

    let Ok(response) = app.clone().oneshot(get("/alerts")).await else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));

    let Ok(response) = app.oneshot(get("/reports/daily")).await else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn dashboard_renders() {
    let app = app().await;
    let Ok(response) = app.oneshot(get("/")).await else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);
    let Ok(collected) = response.into_body().collect().await else {
        panic!("body read failed");
    };
    let html = String::from_utf8_lossy(&collected.to_bytes()).to_string();
    assert!(html.contains("Earthquake Alert Hub"));
    assert!(html.contains("No rules yet"));
}

//! Integration tests for the HTTP API
//!
//! Tests area CRUD, the stateless check and tracker endpoints

use areawatch::core::{create_router, InMemoryAreaStore};
use areawatch::types::{Area, Coordinate};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_router(areas: Vec<Area>) -> Router {
    create_router(Arc::new(InMemoryAreaStore::with_areas(areas).unwrap()))
}

fn home() -> Area {
    Area::new("Home", Coordinate::new(33.0, -96.0), 50.0).with_id("home")
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router(vec![]);
    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["trackersActive"], 0);
}

#[tokio::test]
async fn test_area_crud() {
    let app = create_test_router(vec![]);

    let (status, json) = send(
        &app,
        "POST",
        "/geofences",
        Some(r#"{"name":"Park","center":{"lat":33.0,"lng":-96.0},"radius":75}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["geofence"]["color"], "#FF4444");
    assert_eq!(json["geofence"]["isActive"], true);
    let id = json["geofence"]["id"].as_str().unwrap().to_string();

    let (status, json) = send(&app, "GET", &format!("/geofences/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["geofence"]["name"], "Park");

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/geofences/{}", id),
        Some(r#"{"name":"Park","center":{"lat":33.0,"lng":-96.0},"radius":75,"isActive":false}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["geofence"]["isActive"], false);

    let (_, json) = send(&app, "GET", "/geofences?active=true", None).await;
    assert_eq!(json["total"], 0);
    let (_, json) = send(&app, "GET", "/geofences", None).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["hasMore"], false);

    let (status, _) = send(&app, "DELETE", &format!("/geofences/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = send(&app, "GET", &format!("/geofences/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_create_rejects_non_positive_radius() {
    let app = create_test_router(vec![]);
    let (status, _) = send(
        &app,
        "POST",
        "/geofences",
        Some(r#"{"name":"Park","center":{"lat":33.0,"lng":-96.0},"radius":0}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_endpoint() {
    let mut inactive = Area::new("Closed", Coordinate::new(33.0, -96.0), 50.0).with_id("closed");
    inactive.is_active = false;
    let app = create_test_router(vec![home(), inactive]);

    let (status, json) = send(
        &app,
        "POST",
        "/geofences/check",
        Some(r#"{"location":{"lat":33.0,"lng":-96.0}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["areasChecked"], 1);
    assert_eq!(json["results"][0]["areaId"], "home");
    assert_eq!(json["results"][0]["isInside"], true);
    assert_eq!(json["results"][0]["distance"], 0.0);

    let (status, _) = send(
        &app,
        "POST",
        "/geofences/check",
        Some(r#"{"location":{"lat":95.0,"lng":-96.0}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tracker_flow() {
    let app = create_test_router(vec![home()]);

    let (status, json) = send(&app, "POST", "/tracker/new", None).await;
    assert_eq!(status, StatusCode::OK);
    let tracker_id = json["trackerId"].as_str().unwrap().to_string();
    assert_eq!(json["websocketUrl"], format!("/ws/{}", tracker_id));

    let fix_uri = format!("/tracker/{}/fix", tracker_id);
    let (status, json) = send(&app, "POST", &fix_uri, Some(r#"{"lat":33.0,"lng":-96.0,"accuracy":5}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["events"][0]["direction"], "entered");
    assert_eq!(json["events"][0]["areaId"], "home");
    assert_eq!(json["sampleCount"], 1);
    assert_eq!(json["phase"], "IMPROVING");

    // Same position again: no repeated event
    let (_, json) = send(&app, "POST", &fix_uri, Some(r#"{"lat":33.0,"lng":-96.0}"#)).await;
    assert_eq!(json["events"].as_array().unwrap().len(), 0);

    let (status, _) = send(&app, "POST", &fix_uri, Some(r#"{"lat":33.0,"lng":-196.0}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(&app, "GET", &format!("/tracker/{}", tracker_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sampleCount"], 2);
    assert_eq!(json["updateCount"], 2);
    assert!(json.get("sample_count").is_none());
    assert_eq!(json["inside"][0], "home");
}

#[tokio::test]
async fn test_tracker_not_found() {
    let app = create_test_router(vec![]);

    let (status, _) = send(&app, "GET", "/tracker/nonexistent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/tracker/nonexistent/fix",
        Some(r#"{"lat":33.0,"lng":-96.0}"#),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

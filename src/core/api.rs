//! HTTP + WebSocket API for Areawatch
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /geofences - List areas (?active=&limit=&offset=)
//! - POST /geofences - Create area
//! - GET|PUT|DELETE /geofences/{id} - Single area
//! - POST /geofences/check - Stateless inside/outside check
//! - POST /tracker/new - Create tracker
//! - GET /tracker/{id} - Tracker status
//! - POST /tracker/{id}/fix - Ingest a location fix
//! - WS /ws/{id} - Live tracker updates

use axum::{
    extract::{ws::{Message, WebSocket}, Path, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::core::{AreaStore, GeofenceEvaluator, Tracker};
use crate::error::GeofenceError;
use crate::types::{
    Area, AreaCheck, AreaFilter, AreaPage, AreaUpdate, Coordinate, Fix, NewArea, SmoothingPhase,
    TrackOutput,
};

/// Tracker session
#[derive(Debug)]
pub struct TrackerSession {
    pub id: String,
    pub tracker: Tracker,
    pub update_tx: broadcast::Sender<TrackOutput>,
}

/// App state
pub struct AppState {
    pub trackers: RwLock<HashMap<String, TrackerSession>>,
    pub store: Arc<dyn AreaStore>,
}

/// Error body returned for failed requests
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for GeofenceError {
    fn into_response(self) -> Response {
        let status = match &self {
            GeofenceError::InvalidFix { .. }
            | GeofenceError::InvalidAccuracy(_)
            | GeofenceError::InvalidArea(_) => StatusCode::BAD_REQUEST,
            GeofenceError::AreaNotFound(_) => StatusCode::NOT_FOUND,
            GeofenceError::EmptyHistory | GeofenceError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Health response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub trackers_active: usize,
}

/// Single area response
#[derive(Debug, Serialize)]
pub struct AreaResponse {
    pub success: bool,
    pub geofence: Area,
}

/// Area listing response
#[derive(Debug, Serialize)]
pub struct AreaListResponse {
    pub success: bool,
    #[serde(flatten)]
    pub page: AreaPage,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Check request
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub location: Coordinate,
}

/// Check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub location: Coordinate,
    pub results: Vec<AreaCheck>,
    pub total_areas: usize,
    pub areas_checked: usize,
}

/// Create tracker response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrackerResponse {
    pub tracker_id: String,
    pub websocket_url: String,
}

/// Tracker status response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStatusResponse {
    pub tracker_id: String,
    pub position: Option<Fix>,
    pub phase: SmoothingPhase,
    pub sample_count: usize,
    pub update_count: u64,
    pub inside: Vec<String>,
}

/// Create the API router around an injected area store
pub fn create_router(store: Arc<dyn AreaStore>) -> Router {
    let state = Arc::new(AppState {
        trackers: RwLock::new(HashMap::new()),
        store,
    });

    Router::new()
        .route("/health", get(health))
        .route("/geofences", get(list_areas).post(create_area))
        .route("/geofences/check", post(check_areas))
        .route(
            "/geofences/:id",
            get(get_area).put(update_area).delete(delete_area),
        )
        .route("/tracker/new", post(create_tracker))
        .route("/tracker/:id", get(get_tracker))
        .route("/tracker/:id/fix", post(add_fix))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let trackers = state.trackers.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        trackers_active: trackers.len(),
    })
}

async fn list_areas(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<AreaFilter>,
) -> Result<Json<AreaListResponse>, GeofenceError> {
    let page = state.store.list(filter)?;
    Ok(Json(AreaListResponse {
        success: true,
        page,
    }))
}

async fn create_area(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewArea>,
) -> Result<(StatusCode, Json<AreaResponse>), GeofenceError> {
    let area = state.store.create(req)?;
    Ok((
        StatusCode::CREATED,
        Json(AreaResponse {
            success: true,
            geofence: area,
        }),
    ))
}

async fn get_area(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AreaResponse>, GeofenceError> {
    let area = state.store.get(&id)?;
    Ok(Json(AreaResponse {
        success: true,
        geofence: area,
    }))
}

async fn update_area(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AreaUpdate>,
) -> Result<Json<AreaResponse>, GeofenceError> {
    let area = state.store.update(&id, req)?;
    Ok(Json(AreaResponse {
        success: true,
        geofence: area,
    }))
}

async fn delete_area(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, GeofenceError> {
    state.store.delete(&id)?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Geofence deleted successfully".to_string(),
    }))
}

/// Stateless check against all active areas
async fn check_areas(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, GeofenceError> {
    if !req.location.is_valid() {
        return Err(GeofenceError::InvalidFix {
            lat: req.location.lat,
            lng: req.location.lng,
        });
    }
    let areas = state.store.list(AreaFilter {
        active_only: true,
        limit: usize::MAX,
        offset: 0,
    })?;
    let results = GeofenceEvaluator::new().check(req.location, &areas.areas);

    Ok(Json(CheckResponse {
        location: req.location,
        total_areas: areas.total,
        areas_checked: results.len(),
        results,
    }))
}

/// Create new tracker
async fn create_tracker(State(state): State<Arc<AppState>>) -> Json<NewTrackerResponse> {
    let tracker_id = format!("tracker_{}", uuid::Uuid::new_v4().simple());
    let (tx, _) = broadcast::channel(100);

    let session = TrackerSession {
        id: tracker_id.clone(),
        tracker: Tracker::new(),
        update_tx: tx,
    };

    let mut trackers = state.trackers.write().await;
    trackers.insert(tracker_id.clone(), session);
    info!(tracker = %tracker_id, "created tracker");

    Json(NewTrackerResponse {
        websocket_url: format!("/ws/{}", tracker_id),
        tracker_id,
    })
}

/// Get tracker status
async fn get_tracker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TrackerStatusResponse>, StatusCode> {
    let trackers = state.trackers.read().await;
    let session = trackers.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(TrackerStatusResponse {
        tracker_id: session.id.clone(),
        position: session.tracker.position(),
        phase: session.tracker.phase(),
        sample_count: session.tracker.sample_count(),
        update_count: session.tracker.update_count(),
        inside: session.tracker.membership().inside_ids(),
    }))
}

/// Ingest a fix into a tracker
async fn add_fix(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(fix): Json<Fix>,
) -> Result<Json<TrackOutput>, Response> {
    let areas = state.store.all().map_err(IntoResponse::into_response)?;

    let mut trackers = state.trackers.write().await;
    let session = trackers
        .get_mut(&id)
        .ok_or_else(|| StatusCode::NOT_FOUND.into_response())?;

    let output = session.tracker.ingest(fix, &areas).map_err(|e| {
        warn!(tracker = %id, error = %e, "fix rejected");
        e.into_response()
    })?;

    let _ = session.update_tx.send(output.clone());
    Ok(Json(output))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let trackers = state.trackers.read().await;
    let session = trackers.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = session.update_tx.subscribe();
    drop(trackers);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Handle WebSocket connection
async fn handle_websocket(mut socket: WebSocket, mut rx: broadcast::Receiver<TrackOutput>) {
    while let Ok(update) = rx.recv().await {
        let json = serde_json::to_string(&update).unwrap_or_default();
        if socket.send(Message::Text(json)).await.is_err() {
            break;
        }
    }
}

/// Run the API server
pub async fn run_server(
    addr: &str,
    store: Arc<dyn AreaStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "areawatch API listening");
    axum::serve(listener, router).await?;
    Ok(())
}

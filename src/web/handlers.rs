//! HTTP handlers for the read-only polling API.

use crate::telemetry::SensorReading;
use crate::web::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use serde_json::json;

/// List all sensors' current readings.
pub async fn list_sensors(State(state): State<AppState>) -> Json<serde_json::Value> {
    let registry = state.registry.read().await;
    let sensors = registry.readings();

    Json(json!({
        "sensors": sensors,
        "count": sensors.len(),
        "timestamp": Utc::now(),
    }))
}

/// Look up one sensor's current reading by id.
pub async fn get_sensor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SensorReading>, (StatusCode, Json<serde_json::Value>)> {
    let registry = state.registry.read().await;

    registry.get(&id).map(|reading| Json(reading.clone())).ok_or((
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Sensor not found" })),
    ))
}

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "tirewatch",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
    }))
}

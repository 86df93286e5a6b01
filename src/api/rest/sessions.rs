use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::put;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::models::location::{Coordinate, StoredLocation};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/sessions/:key/location",
        put(update_location).get(get_location),
    )
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}

async fn update_location(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<StoredLocation>, AppError> {
    if key.trim().is_empty() {
        return Err(AppError::BadRequest("session key cannot be empty".to_string()));
    }

    let coordinate = Coordinate::new(payload.latitude, payload.longitude)?;
    let stored = state.sessions.set(&key, coordinate);
    state.metrics.known_locations.set(state.sessions.len() as i64);

    info!(session = %key, location = %coordinate, "caller location updated");
    Ok(Json(stored))
}

async fn get_location(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<StoredLocation>, AppError> {
    let stored = state
        .sessions
        .get(&key)
        .ok_or_else(|| AppError::NotFound(format!("no location for session {key}")))?;

    Ok(Json(stored))
}

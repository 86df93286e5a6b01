use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::engine::skill::find_nearest;
use crate::engine::speech;
use crate::error::AppError;
use crate::models::location::Coordinate;
use crate::models::matching::MatchFilter;
use crate::models::vehicle::{CardinalDirection, VehicleReport};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/vehicles", get(list_vehicles))
        .route("/vehicles/nearest", get(nearest_vehicle))
}

#[derive(Deserialize)]
pub struct NearestQuery {
    pub lat: f64,
    pub lon: f64,
    pub direction: Option<String>,
    pub max_distance_km: Option<f64>,
}

#[derive(Serialize)]
pub struct MatchView {
    pub vehicle_id: String,
    pub eta_minutes: f64,
    pub distance_km: f64,
    pub direction: Option<CardinalDirection>,
}

#[derive(Serialize)]
pub struct NearestResponse {
    pub matched: Option<MatchView>,
    pub speech: String,
}

async fn list_vehicles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<VehicleReport>>, AppError> {
    Ok(Json(state.fetch_vehicles().await?))
}

async fn nearest_vehicle(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearestQuery>,
) -> Result<Json<NearestResponse>, AppError> {
    let origin = Coordinate::new(query.lat, query.lon)?;

    let direction = query
        .direction
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(str::parse::<CardinalDirection>)
        .transpose()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    if query
        .max_distance_km
        .is_some_and(|km| !km.is_finite() || km < 0.0)
    {
        return Err(AppError::BadRequest(
            "max_distance_km must be a non-negative number".to_string(),
        ));
    }

    let filter = MatchFilter {
        direction,
        max_distance_km: query.max_distance_km.or(state.default_max_distance_km),
    };

    let response = match find_nearest(&state, &origin, &filter).await? {
        Some(result) => NearestResponse {
            speech: speech::bus_time(&result),
            matched: Some(MatchView {
                eta_minutes: result.rounded_eta_minutes(),
                distance_km: (result.distance_km * 1000.0).round() / 1000.0,
                vehicle_id: result.vehicle_id,
                direction: result.direction,
            }),
        },
        None => NearestResponse {
            matched: None,
            speech: speech::no_match(&filter),
        },
    };

    Ok(Json(response))
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::vehicle::CardinalDirection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchFilter {
    pub direction: Option<CardinalDirection>,
    pub max_distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub vehicle_id: String,
    pub eta_minutes: f64,
    pub distance_km: f64,
    pub direction: Option<CardinalDirection>,
}

impl MatchResult {
    /// ETA rounded to two decimals, the precision used when presenting it.
    pub fn rounded_eta_minutes(&self) -> f64 {
        (self.eta_minutes * 100.0).round() / 100.0
    }
}

/// Published on the event channel each time a bus query is answered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: Uuid,
    pub session_key: Option<String>,
    pub vehicle_id: String,
    pub eta_minutes: f64,
    pub direction: Option<CardinalDirection>,
    pub matched_at: DateTime<Utc>,
}

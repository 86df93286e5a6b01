use std::time::Instant;

use tokio::sync::broadcast;

use crate::engine::matcher::VehicleMatcher;
use crate::error::AppError;
use crate::models::matching::MatchEvent;
use crate::models::vehicle::VehicleReport;
use crate::observability::metrics::Metrics;
use crate::sessions::SessionStore;
use crate::transit::TransitFeed;

pub struct AppState {
    pub sessions: SessionStore,
    pub feed: TransitFeed,
    pub matcher: VehicleMatcher,
    pub default_max_distance_km: Option<f64>,
    pub match_events_tx: broadcast::Sender<MatchEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(feed: TransitFeed, matcher: VehicleMatcher, event_buffer_size: usize) -> Self {
        let (match_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            sessions: SessionStore::new(),
            feed,
            matcher,
            default_max_distance_km: None,
            match_events_tx,
            metrics: Metrics::new(),
        }
    }

    pub fn with_default_max_distance(mut self, max_distance_km: Option<f64>) -> Self {
        self.default_max_distance_km = max_distance_km;
        self
    }

    /// Fetches the current vehicle reports and records the fetch latency.
    pub async fn fetch_vehicles(&self) -> Result<Vec<VehicleReport>, AppError> {
        let start = Instant::now();
        let result = self.feed.vehicles().await;
        let outcome = if result.is_ok() { "success" } else { "error" };

        self.metrics
            .feed_fetch_latency_seconds
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        result
    }
}

pub mod client;
pub mod payload;

use crate::error::AppError;
use crate::models::location::Coordinate;
use crate::models::vehicle::VehicleReport;

pub use client::TransitClient;
pub use payload::FeedFormat;

/// Where vehicle reports come from. The remote provider is polled once per
/// request; nothing is cached between requests.
#[derive(Debug, Clone)]
pub enum TransitFeed {
    Static(Vec<VehicleReport>),
    Remote(TransitClient),
}

impl TransitFeed {
    pub fn demo() -> Self {
        TransitFeed::Static(demo_fleet())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TransitFeed::Static(_) => "static",
            TransitFeed::Remote(_) => "remote",
        }
    }

    /// Provider endpoint, if the feed is remote.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            TransitFeed::Static(_) => None,
            TransitFeed::Remote(client) => Some(client.url()),
        }
    }

    pub async fn vehicles(&self) -> Result<Vec<VehicleReport>, AppError> {
        match self {
            TransitFeed::Static(reports) => Ok(reports.clone()),
            TransitFeed::Remote(client) => client.fetch_vehicles().await,
        }
    }
}

/// Three buses on the lakefront south of the Loop, around 41.85, -87.62.
pub fn demo_fleet() -> Vec<VehicleReport> {
    let bus = |id: &str, latitude: f64, longitude: f64, heading: f64| VehicleReport {
        id: id.to_string(),
        coordinate: Coordinate {
            latitude,
            longitude,
        },
        heading: Some(heading),
        route: Some("3".to_string()),
    };

    vec![
        bus("1362", 41.851637, -87.619049, 358.0),
        bus("8679", 41.811370, -87.616706, 182.0),
        bus("7921", 41.721882, -87.618286, 3.0),
    ]
}

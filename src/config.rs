use std::env;
use std::time::Duration;

use crate::engine::matcher::VehicleMatcher;
use crate::error::AppError;
use crate::geo::DEFAULT_SPEED_KMH;
use crate::transit::{FeedFormat, TransitClient, TransitFeed};

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: String,
    pub event_buffer_size: usize,
    pub average_speed_kmh: f64,
    pub default_max_distance_km: Option<f64>,
    pub transit: Option<TransitConfig>,
}

#[derive(Debug, Clone)]
pub struct TransitConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub route: Option<String>,
    pub format: FeedFormat,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let average_speed_kmh = parse_or_default("AVERAGE_SPEED_KMH", DEFAULT_SPEED_KMH)?;
        if !average_speed_kmh.is_finite() || average_speed_kmh <= 0.0 {
            return Err(AppError::Internal(format!(
                "invalid AVERAGE_SPEED_KMH: must be > 0, got {average_speed_kmh}"
            )));
        }

        let default_max_distance_km = parse_optional::<f64>("DEFAULT_MAX_DISTANCE_KM")?;
        if default_max_distance_km.is_some_and(|km| !km.is_finite() || km < 0.0) {
            return Err(AppError::Internal(
                "invalid DEFAULT_MAX_DISTANCE_KM: must be >= 0".to_string(),
            ));
        }

        let transit = match non_empty("TRANSIT_API_URL") {
            Some(url) => Some(TransitConfig {
                url,
                api_key: non_empty("TRANSIT_API_KEY"),
                route: non_empty("TRANSIT_ROUTE"),
                format: parse_or_default("TRANSIT_FORMAT", FeedFormat::Json)?,
                timeout: Duration::from_secs(parse_or_default("TRANSIT_TIMEOUT_SECS", 5)?),
            }),
            None => None,
        };

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            average_speed_kmh,
            default_max_distance_km,
            transit,
        })
    }

    pub fn matcher(&self) -> VehicleMatcher {
        VehicleMatcher::new(self.average_speed_kmh)
    }

    /// Remote provider when one is configured, the demo fleet otherwise.
    pub fn feed(&self) -> Result<TransitFeed, AppError> {
        match &self.transit {
            Some(transit) => Ok(TransitFeed::Remote(TransitClient::new(
                transit.url.clone(),
                transit.api_key.clone(),
                transit.route.clone(),
                transit.format,
                transit.timeout,
            )?)),
            None => Ok(TransitFeed::demo()),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_optional(key)?.unwrap_or(default))
}

fn parse_optional<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        None => Ok(None),
    }
}

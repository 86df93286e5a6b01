use std::time::Duration;

use tracing::debug;

use crate::error::AppError;
use crate::models::vehicle::VehicleReport;
use crate::transit::payload::{parse_vehicles, FeedFormat};

#[derive(Debug, Clone)]
pub struct TransitClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    route: Option<String>,
    format: FeedFormat,
}

impl TransitClient {
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        route: Option<String>,
        format: FeedFormat,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Internal(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            url: url.into(),
            api_key,
            route,
            format,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch_vehicles(&self) -> Result<Vec<VehicleReport>, AppError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(key) = &self.api_key {
            query.push(("key", key.as_str()));
        }
        if let Some(route) = &self.route {
            query.push(("rt", route.as_str()));
        }
        if self.format == FeedFormat::Json {
            query.push(("format", "json"));
        }

        let response = self
            .http
            .get(&self.url)
            .query(&query)
            .send()
            .await
            .map_err(|err| AppError::UpstreamUnavailable(format!("request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "provider returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|err| AppError::UpstreamUnavailable(format!("failed to read body: {err}")))?;

        let vehicles = parse_vehicles(&body, self.format)?;
        debug!(count = vehicles.len(), "fetched vehicle reports");

        Ok(vehicles)
    }
}

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use bus_tracker::api;
use bus_tracker::config::Config;
use bus_tracker::error::AppError;
use bus_tracker::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);
    if config.log_format.eq_ignore_ascii_case("json") {
        subscriber.json().init();
    } else {
        subscriber.compact().init();
    }

    let feed = config.feed()?;
    let matcher = config.matcher();
    tracing::info!(
        feed = feed.kind(),
        endpoint = feed.endpoint().unwrap_or("demo fleet"),
        speed_kmh = matcher.speed_kmh(),
        "vehicle feed configured"
    );

    let app_state = AppState::new(feed, matcher, config.event_buffer_size)
        .with_default_max_distance(config.default_max_distance_km);
    let app = api::rest::router(Arc::new(app_state));

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}

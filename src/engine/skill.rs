use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::intents::SkillRequest;
use crate::engine::speech;
use crate::error::AppError;
use crate::models::location::Coordinate;
use crate::models::matching::{MatchEvent, MatchFilter, MatchResult};
use crate::models::skill::{SkillEnvelope, SkillResponse};
use crate::state::AppState;

/// Answers one voice request. Domain failures become spoken replies, so the
/// caller always gets a response envelope back.
pub async fn handle_envelope(state: &AppState, envelope: &SkillEnvelope) -> SkillResponse {
    let session_key = envelope.session_key();

    let request = match SkillRequest::from_request(&envelope.request) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, request_type = %envelope.request.kind, "rejected skill request");
            state
                .metrics
                .skill_requests_total
                .with_label_values(&["invalid"])
                .inc();
            return SkillResponse::speak(speech::failure(&err), false);
        }
    };

    state
        .metrics
        .skill_requests_total
        .with_label_values(&[request.label()])
        .inc();
    info!(
        intent = request.label(),
        session = session_key.as_deref().unwrap_or("-"),
        "skill request"
    );

    match dispatch(state, envelope, session_key.as_deref(), request).await {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "skill request failed");
            SkillResponse::speak(speech::failure(&err), false)
        }
    }
}

async fn dispatch(
    state: &AppState,
    envelope: &SkillEnvelope,
    session_key: Option<&str>,
    request: SkillRequest,
) -> Result<SkillResponse, AppError> {
    let response = match request {
        SkillRequest::Launch => SkillResponse::speak(speech::WELCOME, false),
        SkillRequest::GetBusTime {
            direction,
            max_distance_km,
        } => {
            let origin = resolve_origin(state, envelope, session_key)?;
            let filter = MatchFilter {
                direction,
                max_distance_km: max_distance_km.or(state.default_max_distance_km),
            };

            let text = match find_nearest(state, &origin, &filter).await? {
                Some(result) => {
                    publish_match(state, session_key, &result);
                    speech::bus_time(&result)
                }
                None => speech::no_match(&filter),
            };
            SkillResponse::speak(text, true)
        }
        SkillRequest::SetLocation { coordinate } => {
            let Some(key) = session_key else {
                return Ok(SkillResponse::speak(speech::NO_SESSION, true));
            };
            state.sessions.set(key, coordinate);
            state.metrics.known_locations.set(state.sessions.len() as i64);
            info!(session = key, location = %coordinate, "caller location updated");
            SkillResponse::speak(speech::location_set(&coordinate), false)
        }
        SkillRequest::GetLocation => {
            let stored = session_key.and_then(|key| state.sessions.get(key));
            match stored {
                Some(stored) => {
                    SkillResponse::speak(speech::current_location(&stored.coordinate), false)
                }
                None => SkillResponse::speak(speech::LOCATION_UNKNOWN, false),
            }
        }
        SkillRequest::Help => SkillResponse::speak(speech::HELP, false),
        SkillRequest::Stop => SkillResponse::speak(speech::GOODBYE, true),
        SkillRequest::SessionEnded => SkillResponse::silent(),
        SkillRequest::Unknown { name } => {
            warn!(intent = %name, "unhandled intent");
            SkillResponse::speak(speech::NOT_UNDERSTOOD, false)
        }
    };

    Ok(response)
}

/// Device geolocation from the request wins over a location the caller set
/// earlier in the session.
fn resolve_origin(
    state: &AppState,
    envelope: &SkillEnvelope,
    session_key: Option<&str>,
) -> Result<Coordinate, AppError> {
    if let Some(device) = envelope.device_coordinate() {
        return Coordinate::new(device.latitude_in_degrees, device.longitude_in_degrees);
    }

    session_key
        .and_then(|key| state.sessions.get(key))
        .map(|stored| stored.coordinate)
        .ok_or(AppError::LocationUnknown)
}

/// Fetches the feed and picks the best vehicle for `origin`.
pub async fn find_nearest(
    state: &AppState,
    origin: &Coordinate,
    filter: &MatchFilter,
) -> Result<Option<MatchResult>, AppError> {
    let vehicles = state.fetch_vehicles().await?;
    let best = state.matcher.find_best(origin, &vehicles, filter);

    let outcome = if best.is_some() { "matched" } else { "no_match" };
    state
        .metrics
        .match_outcomes_total
        .with_label_values(&[outcome])
        .inc();

    Ok(best)
}

fn publish_match(state: &AppState, session_key: Option<&str>, result: &MatchResult) {
    let event = MatchEvent {
        id: Uuid::new_v4(),
        session_key: session_key.map(str::to_string),
        vehicle_id: result.vehicle_id.clone(),
        eta_minutes: result.rounded_eta_minutes(),
        direction: result.direction,
        matched_at: Utc::now(),
    };

    info!(
        vehicle_id = %event.vehicle_id,
        eta_minutes = event.eta_minutes,
        "bus matched"
    );
    let _ = state.match_events_tx.send(event);
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::handle_envelope;
    use crate::engine::matcher::VehicleMatcher;
    use crate::models::skill::SkillEnvelope;
    use crate::state::AppState;
    use crate::transit::TransitFeed;

    fn state() -> AppState {
        AppState::new(TransitFeed::demo(), VehicleMatcher::default(), 16)
    }

    fn envelope(value: Value) -> SkillEnvelope {
        serde_json::from_value(value).unwrap()
    }

    fn intent(session: &str, name: &str, slots: Value) -> SkillEnvelope {
        envelope(json!({
            "session": { "sessionId": session },
            "request": { "type": "IntentRequest", "intent": { "name": name, "slots": slots } }
        }))
    }

    #[tokio::test]
    async fn launch_welcomes_and_keeps_session_open() {
        let response = handle_envelope(
            &state(),
            &envelope(json!({ "request": { "type": "LaunchRequest" } })),
        )
        .await;

        assert!(response.text().unwrap().starts_with("Welcome to the Bus Tracker"));
        assert!(!response.response.should_end_session);
    }

    #[tokio::test]
    async fn bus_time_without_location_asks_for_one() {
        let response =
            handle_envelope(&state(), &intent("s-1", "GetBusTimeIntent", json!({}))).await;

        assert!(response.text().unwrap().contains("I don't know where you are"));
    }

    #[tokio::test]
    async fn set_location_then_ask_for_the_bus() {
        let state = state();

        let response = handle_envelope(
            &state,
            &intent(
                "s-1",
                "SetLocationIntent",
                json!({
                    "latitude": { "value": "forty one point eight five" },
                    "longitude": { "value": "minus eighty seven point six two" }
                }),
            ),
        )
        .await;
        assert_eq!(
            response.text(),
            Some("Got it. Your location is set to 41.85, -87.62.")
        );

        let mut events = state.match_events_tx.subscribe();
        let response =
            handle_envelope(&state, &intent("s-1", "GetBusTimeIntent", json!({}))).await;
        let text = response.text().unwrap();

        assert!(text.starts_with("Bus 1362 heading North is approximately"));
        assert!(response.response.should_end_session);

        let event = events.try_recv().unwrap();
        assert_eq!(event.vehicle_id, "1362");
        assert_eq!(event.session_key.as_deref(), Some("s-1"));
    }

    #[tokio::test]
    async fn locations_are_per_session() {
        let state = state();
        handle_envelope(
            &state,
            &intent(
                "s-1",
                "SetLocationIntent",
                json!({ "latitude": { "value": "41.85" }, "longitude": { "value": "-87.62" } }),
            ),
        )
        .await;

        let response =
            handle_envelope(&state, &intent("s-2", "GetLocationIntent", json!({}))).await;
        assert!(response.text().unwrap().contains("I don't know where you are"));

        let response =
            handle_envelope(&state, &intent("s-1", "GetLocationIntent", json!({}))).await;
        assert_eq!(response.text(), Some("Your location is 41.85, -87.62."));
    }

    #[tokio::test]
    async fn direction_filter_picks_the_southbound_bus() {
        let response = handle_envelope(
            &state(),
            &envelope(json!({
                "context": { "geolocation": { "coordinate": {
                    "latitudeInDegrees": 41.85, "longitudeInDegrees": -87.62
                } } },
                "request": {
                    "type": "IntentRequest",
                    "intent": { "name": "GetBusTimeIntent",
                                "slots": { "direction": { "value": "southbound" } } }
                }
            })),
        )
        .await;

        assert!(response.text().unwrap().starts_with("Bus 8679 heading South"));
    }

    #[tokio::test]
    async fn nothing_within_distance_is_no_match() {
        let response = handle_envelope(
            &state(),
            &envelope(json!({
                "context": { "geolocation": { "coordinate": {
                    "latitudeInDegrees": 41.85, "longitudeInDegrees": -87.62
                } } },
                "request": {
                    "type": "IntentRequest",
                    "intent": { "name": "GetBusTimeIntent",
                                "slots": { "distance": { "value": "zero point one" } } }
                }
            })),
        )
        .await;

        assert_eq!(response.text(), Some("No buses are near you right now."));
    }

    #[tokio::test]
    async fn set_location_without_session_cannot_be_remembered() {
        let state = state();
        let response = handle_envelope(
            &state,
            &envelope(json!({
                "request": {
                    "type": "IntentRequest",
                    "intent": { "name": "SetLocationIntent", "slots": {
                        "latitude": { "value": "41.85" }, "longitude": { "value": "-87.62" }
                    } }
                }
            })),
        )
        .await;

        assert!(response.text().unwrap().contains("without a session"));
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn invalid_spoken_location_is_explained() {
        let response = handle_envelope(
            &state(),
            &intent(
                "s-1",
                "SetLocationIntent",
                json!({ "latitude": { "value": "ninety five" }, "longitude": { "value": "0" } }),
            ),
        )
        .await;

        assert!(response.text().unwrap().contains("valid location"));
    }

    #[tokio::test]
    async fn session_end_is_silent() {
        let response = handle_envelope(
            &state(),
            &envelope(json!({ "request": { "type": "SessionEndedRequest" } })),
        )
        .await;

        assert!(response.text().is_none());
        assert!(response.response.should_end_session);
    }

    #[tokio::test]
    async fn stop_and_help() {
        let state = state();

        let stop =
            handle_envelope(&state, &intent("s-1", "AMAZON.CancelIntent", json!({}))).await;
        assert_eq!(stop.text(), Some("Goodbye."));
        assert!(stop.response.should_end_session);

        let help = handle_envelope(&state, &intent("s-1", "AMAZON.HelpIntent", json!({}))).await;
        assert!(help.text().unwrap().contains("latitude and longitude"));
    }
}

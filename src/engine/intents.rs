use crate::engine::spoken::parse_spoken_number;
use crate::error::AppError;
use crate::models::location::Coordinate;
use crate::models::skill::{IntentBody, SkillRequestBody};
use crate::models::vehicle::CardinalDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    GetBusTime,
    SetLocation,
    GetLocation,
    Help,
    Stop,
}

/// Intent names the skill answers to. Anything not listed here is routed to
/// the fallback reply.
pub const INTENT_TABLE: &[(&str, IntentKind)] = &[
    ("GetBusTimeIntent", IntentKind::GetBusTime),
    ("SetLocationIntent", IntentKind::SetLocation),
    ("GetLocationIntent", IntentKind::GetLocation),
    ("AMAZON.HelpIntent", IntentKind::Help),
    ("AMAZON.StopIntent", IntentKind::Stop),
    ("AMAZON.CancelIntent", IntentKind::Stop),
];

pub fn lookup_intent(name: &str) -> Option<IntentKind> {
    INTENT_TABLE
        .iter()
        .find(|(entry, _)| *entry == name)
        .map(|(_, kind)| *kind)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkillRequest {
    Launch,
    GetBusTime {
        direction: Option<CardinalDirection>,
        max_distance_km: Option<f64>,
    },
    SetLocation {
        coordinate: Coordinate,
    },
    GetLocation,
    Help,
    Stop,
    SessionEnded,
    Unknown {
        name: String,
    },
}

impl SkillRequest {
    /// Label used for logging and the per-intent request counter.
    pub fn label(&self) -> &'static str {
        match self {
            SkillRequest::Launch => "launch",
            SkillRequest::GetBusTime { .. } => "get_bus_time",
            SkillRequest::SetLocation { .. } => "set_location",
            SkillRequest::GetLocation => "get_location",
            SkillRequest::Help => "help",
            SkillRequest::Stop => "stop",
            SkillRequest::SessionEnded => "session_ended",
            SkillRequest::Unknown { .. } => "unknown",
        }
    }

    pub fn from_request(body: &SkillRequestBody) -> Result<Self, AppError> {
        match body.kind.as_str() {
            "LaunchRequest" => Ok(SkillRequest::Launch),
            "SessionEndedRequest" => Ok(SkillRequest::SessionEnded),
            "IntentRequest" => {
                let intent = body.intent.as_ref().ok_or_else(|| {
                    AppError::BadRequest("intent request without an intent".to_string())
                })?;
                Self::from_intent(intent)
            }
            other => Err(AppError::BadRequest(format!(
                "unsupported request type: {other}"
            ))),
        }
    }

    fn from_intent(intent: &IntentBody) -> Result<Self, AppError> {
        let Some(kind) = lookup_intent(&intent.name) else {
            return Ok(SkillRequest::Unknown {
                name: intent.name.clone(),
            });
        };

        let request = match kind {
            IntentKind::GetBusTime => SkillRequest::GetBusTime {
                direction: intent
                    .slot("direction")
                    .map(|raw| raw.parse::<CardinalDirection>())
                    .transpose()
                    .map_err(|err| AppError::BadRequest(err.to_string()))?,
                max_distance_km: intent.slot("distance").map(parse_distance).transpose()?,
            },
            IntentKind::SetLocation => {
                let latitude = required_number(intent, "latitude")?;
                let longitude = required_number(intent, "longitude")?;
                SkillRequest::SetLocation {
                    coordinate: Coordinate::new(latitude, longitude)?,
                }
            }
            IntentKind::GetLocation => SkillRequest::GetLocation,
            IntentKind::Help => SkillRequest::Help,
            IntentKind::Stop => SkillRequest::Stop,
        };

        Ok(request)
    }
}

fn required_number(intent: &IntentBody, slot: &str) -> Result<f64, AppError> {
    let raw = intent
        .slot(slot)
        .ok_or_else(|| AppError::InvalidLocation(format!("{slot} is required")))?;
    Ok(parse_spoken_number(raw)?)
}

fn parse_distance(raw: &str) -> Result<f64, AppError> {
    let value = parse_spoken_number(raw)
        .map_err(|err| AppError::BadRequest(format!("invalid distance: {err}")))?;

    if !value.is_finite() || value < 0.0 {
        return Err(AppError::BadRequest(format!(
            "distance must be a non-negative number, got {raw}"
        )));
    }
    Ok(value)
}

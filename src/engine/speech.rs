use crate::error::AppError;
use crate::models::location::Coordinate;
use crate::models::matching::{MatchFilter, MatchResult};

pub const WELCOME: &str = "Welcome to the Bus Tracker. Ask me how far the bus is from you.";
pub const HELP: &str = "You can ask how far the bus is, ask for a northbound or southbound bus, \
     or set your location by saying your latitude and longitude.";
pub const GOODBYE: &str = "Goodbye.";
pub const NOT_UNDERSTOOD: &str = "Sorry, I didn't catch that. Ask me how far the bus is from you.";
pub const LOCATION_UNKNOWN: &str = "I don't know where you are yet. \
     Tell me your latitude and longitude, or allow the skill to use your device location.";
pub const NO_SESSION: &str = "I can't remember a location without a session. Please try again.";

pub fn bus_time(result: &MatchResult) -> String {
    match result.direction {
        Some(direction) => format!(
            "Bus {} heading {} is approximately {:.2} minutes away.",
            result.vehicle_id, direction, result.eta_minutes
        ),
        None => format!(
            "Bus {} is approximately {:.2} minutes away.",
            result.vehicle_id, result.eta_minutes
        ),
    }
}

pub fn no_match(filter: &MatchFilter) -> String {
    match filter.direction {
        Some(direction) => format!(
            "No {}bound buses are near you right now.",
            direction.as_str().to_lowercase()
        ),
        None => "No buses are near you right now.".to_string(),
    }
}

pub fn location_set(coordinate: &Coordinate) -> String {
    format!("Got it. Your location is set to {coordinate}.")
}

pub fn current_location(coordinate: &Coordinate) -> String {
    format!("Your location is {coordinate}.")
}

/// Sentence for a failure while answering a request. Errors that mean the
/// caller should simply retry are phrased that way.
pub fn failure(err: &AppError) -> String {
    match err {
        AppError::LocationUnknown => LOCATION_UNKNOWN.to_string(),
        AppError::InvalidLocation(_) => {
            "That doesn't sound like a valid location. Latitude must be between \
             minus ninety and ninety, and longitude between minus one hundred eighty \
             and one hundred eighty."
                .to_string()
        }
        AppError::BadRequest(_) => NOT_UNDERSTOOD.to_string(),
        AppError::UpstreamUnavailable(_) => {
            "I couldn't reach the transit service. Please try again later.".to_string()
        }
        AppError::MalformedFeed(_) => {
            "I had trouble reading the bus data. Please try again.".to_string()
        }
        AppError::NotFound(_) | AppError::Internal(_) => {
            "Something went wrong. Please try again later.".to_string()
        }
    }
}

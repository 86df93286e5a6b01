use crate::models::location::Coordinate;
use crate::models::vehicle::CardinalDirection;

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Average bus speed used for travel-time estimates.
pub const DEFAULT_SPEED_KMH: f64 = 32.0;

pub fn distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

pub fn eta_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    debug_assert!(speed_kmh > 0.0, "speed must be positive, got {speed_kmh}");
    distance_km / speed_kmh * 60.0
}

/// Quadrants are half-open and clockwise: a heading exactly on a boundary
/// belongs to the next direction round the compass.
pub fn cardinal_direction(heading_degrees: f64) -> CardinalDirection {
    let heading = heading_degrees.rem_euclid(360.0);

    if !(45.0..315.0).contains(&heading) {
        CardinalDirection::North
    } else if heading < 135.0 {
        CardinalDirection::East
    } else if heading < 225.0 {
        CardinalDirection::South
    } else {
        CardinalDirection::West
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::location::Coordinate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleReport {
    pub id: String,
    pub coordinate: Coordinate,
    pub heading: Option<f64>,
    pub route: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardinalDirection {
    North,
    East,
    South,
    West,
}

impl CardinalDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardinalDirection::North => "North",
            CardinalDirection::East => "East",
            CardinalDirection::South => "South",
            CardinalDirection::West => "West",
        }
    }
}

impl std::fmt::Display for CardinalDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown direction: {0}, expected North/East/South/West")]
pub struct UnknownDirection(pub String);

impl std::str::FromStr for CardinalDirection {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let word = lowered.strip_suffix("bound").unwrap_or(&lowered).trim();

        match word {
            "north" | "n" => Ok(CardinalDirection::North),
            "east" | "e" => Ok(CardinalDirection::East),
            "south" | "s" => Ok(CardinalDirection::South),
            "west" | "w" => Ok(CardinalDirection::West),
            _ => Err(UnknownDirection(s.to_string())),
        }
    }
}

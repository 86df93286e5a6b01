use chrono::Utc;
use dashmap::DashMap;

use crate::models::location::{Coordinate, StoredLocation};

/// Last location each caller told us about, keyed by session identity.
/// Writes for one key replace the previous value; keys never interfere.
#[derive(Default)]
pub struct SessionStore {
    locations: DashMap<String, StoredLocation>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: &str, coordinate: Coordinate) -> StoredLocation {
        let stored = StoredLocation {
            coordinate,
            updated_at: Utc::now(),
        };
        self.locations.insert(key.to_string(), stored.clone());
        stored
    }

    pub fn get(&self, key: &str) -> Option<StoredLocation> {
        self.locations.get(key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temperature text shown for a city that has never been refreshed.
pub const TEMPERATURE_PLACEHOLDER: &str = "0";

/// Icon selector given to cities the user adds by hand.
pub const DEFAULT_ICON_FLAG: i32 = 1;

/// One tracked location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
    /// Last reading as display text, or an error text after a failed refresh.
    pub temperature: String,
    pub latitude: String,
    pub longitude: String,
    pub icon_flag: i32,
    pub last_sync_time: DateTime<Utc>,
}

impl City {
    /// Id of a record the store has not assigned yet.
    pub const UNSAVED_ID: i64 = -1;

    pub fn is_persisted(&self) -> bool {
        self.id != Self::UNSAVED_ID
    }
}

/// A validated city waiting to be inserted.
///
/// Produced by the add-city flow and consumed by the list controller; it is
/// never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CityCandidate {
    name: String,
    temperature: String,
    latitude: String,
    longitude: String,
    icon_flag: i32,
    last_sync_time: DateTime<Utc>,
}

impl CityCandidate {
    pub(crate) fn new(
        name: String,
        latitude: String,
        longitude: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            temperature: TEMPERATURE_PLACEHOLDER.to_string(),
            latitude,
            longitude,
            icon_flag: DEFAULT_ICON_FLAG,
            last_sync_time: created_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn temperature(&self) -> &str {
        &self.temperature
    }

    pub fn latitude(&self) -> &str {
        &self.latitude
    }

    pub fn longitude(&self) -> &str {
        &self.longitude
    }

    pub fn icon_flag(&self) -> i32 {
        self.icon_flag
    }

    pub fn last_sync_time(&self) -> DateTime<Utc> {
        self.last_sync_time
    }

    /// Render the candidate as an unsaved `City`.
    pub fn to_city(&self) -> City {
        self.clone().with_id(City::UNSAVED_ID)
    }

    /// Turn the candidate into a `City` carrying a store-assigned id.
    pub fn with_id(self, id: i64) -> City {
        City {
            id,
            name: self.name,
            temperature: self.temperature,
            latitude: self.latitude,
            longitude: self.longitude,
            icon_flag: self.icon_flag,
            last_sync_time: self.last_sync_time,
        }
    }
}

/// Best geocoding match for a place name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeMatch {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
}

//! Typed errors for the sync flow.
//!
//! Every error exposes `user_message()` with a short text suitable for a
//! transient notification. `Display` keeps the technical detail for logs.

use std::fmt;

use thiserror::Error;

/// Form field targeted by a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Latitude,
    Longitude,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bad user input, caught before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Missing(Field),

    #[error("{0} must be a number")]
    NotNumeric(Field),

    #[error("{0} is out of range")]
    OutOfRange(Field),
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Missing(field)
            | ValidationError::NotNumeric(field)
            | ValidationError::OutOfRange(field) => *field,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::Missing(Field::Name) => "Please enter a city name",
            ValidationError::Missing(Field::Latitude) => "Please enter a latitude",
            ValidationError::Missing(Field::Longitude) => "Please enter a longitude",
            ValidationError::NotNumeric(Field::Latitude) => "Latitude must be a number",
            ValidationError::NotNumeric(Field::Longitude) => "Longitude must be a number",
            ValidationError::NotNumeric(Field::Name) => "Invalid city name",
            ValidationError::OutOfRange(Field::Latitude) => {
                "Latitude must be between -90 and 90"
            }
            ValidationError::OutOfRange(Field::Longitude) => {
                "Longitude must be between -180 and 180"
            }
            ValidationError::OutOfRange(Field::Name) => "Invalid city name",
        }
    }
}

/// Geocoding failures.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("place name is empty")]
    EmptyInput,

    #[error("user agent is not a valid header value: {0:?}")]
    InvalidUserAgent(String),

    #[error("geocoding request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("geocoding request failed with status {status}: {body}")]
    Server { status: u16, body: String },

    #[error("no place matched the query")]
    NoMatch,

    #[error("malformed geocoding response: {0}")]
    MalformedResponse(String),
}

impl GeocodeError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeocodeError::EmptyInput => "Enter a city name",
            GeocodeError::InvalidUserAgent(_) => "Invalid client identifier in configuration",
            GeocodeError::Network(_) => "Connection error",
            GeocodeError::Server { .. } => "Server error",
            GeocodeError::NoMatch => "City not found",
            GeocodeError::MalformedResponse(_) => "Data processing error",
        }
    }
}

/// Forecast failures.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("forecast request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("forecast request failed with status {status}: {body}")]
    Server { status: u16, body: String },

    #[error("malformed forecast response: {0}")]
    MalformedResponse(String),
}

impl ForecastError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ForecastError::Network(_) => "Connection failed",
            ForecastError::Server { .. } => "Connection error",
            ForecastError::MalformedResponse(_) => "Data processing error",
        }
    }

    /// Text written into a city's temperature when a refresh fails.
    pub fn temperature_text(&self) -> &'static str {
        match self {
            ForecastError::Network(_) => "connection error",
            ForecastError::Server { .. } => "network error",
            ForecastError::MalformedResponse(_) => "data error",
        }
    }
}

/// City store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("city {0} not found")]
    NotFound(i64),

    #[error("failed to open city store at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StoreError::Database(_) | StoreError::Open { .. } => {
                "Could not access saved cities"
            }
            StoreError::NotFound(_) => "City no longer exists",
        }
    }
}

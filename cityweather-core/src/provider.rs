use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::{ForecastError, GeocodeError},
    model::GeocodeMatch,
    provider::{nominatim::GeocodingClient, openmeteo::ForecastClient},
};

pub mod nominatim;
pub mod openmeteo;

/// Resolves a free-text place name into coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn resolve(&self, place_name: &str) -> Result<GeocodeMatch, GeocodeError>;
}

/// Fetches the current temperature for a coordinate pair.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch_current_temperature(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> Result<String, ForecastError>;
}

/// Construct the geocoder described by `config`.
pub fn geocoder_from_config(config: &Config) -> Result<Box<dyn Geocoder>, GeocodeError> {
    Ok(Box::new(GeocodingClient::new(
        config.geocoding.endpoint.clone(),
        config.user_agent.clone(),
    )?))
}

/// Construct the forecast source described by `config`.
pub fn forecast_from_config(config: &Config) -> Box<dyn ForecastSource> {
    Box::new(ForecastClient::from_config(&config.forecast))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

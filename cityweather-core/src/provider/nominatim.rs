use async_trait::async_trait;
use reqwest::{
    Client,
    header::{HeaderValue, USER_AGENT},
};
use serde::Deserialize;

use crate::{error::GeocodeError, model::GeocodeMatch, provider::truncate_body};

use super::Geocoder;

/// Forward geocoding against a Nominatim-compatible `/search` endpoint.
///
/// Nominatim's usage policy requires an identifying `User-Agent` on every
/// request, so it is set per request rather than left to the client default.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    endpoint: String,
    user_agent: HeaderValue,
    http: Client,
}

impl GeocodingClient {
    /// Fails if `user_agent` cannot be sent as an HTTP header value.
    pub fn new(endpoint: String, user_agent: String) -> Result<Self, GeocodeError> {
        let user_agent = HeaderValue::from_str(&user_agent)
            .map_err(|_| GeocodeError::InvalidUserAgent(user_agent))?;
        Ok(Self {
            endpoint,
            user_agent,
            http: Client::new(),
        })
    }

    pub async fn resolve(&self, place_name: &str) -> Result<GeocodeMatch, GeocodeError> {
        let query = place_name.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyInput);
        }

        tracing::debug!(query, endpoint = %self.endpoint, "geocoding request");

        let res = self
            .http
            .get(&self.endpoint)
            .header(USER_AGENT, self.user_agent.clone())
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(GeocodeError::Network)?;

        let status = res.status();
        let body = res.text().await.map_err(GeocodeError::Network)?;

        if !status.is_success() {
            return Err(GeocodeError::Server {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let places: Vec<NominatimPlace> = serde_json::from_str(&body)
            .map_err(|e| GeocodeError::MalformedResponse(e.to_string()))?;

        let first = places.into_iter().next().ok_or(GeocodeError::NoMatch)?;

        let name = first
            .display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| query.to_string());

        tracing::debug!(%name, lat = %first.lat, lon = %first.lon, "geocoded");

        Ok(GeocodeMatch {
            name,
            latitude: first.lat,
            longitude: first.lon,
        })
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

#[async_trait]
impl Geocoder for GeocodingClient {
    async fn resolve(&self, place_name: &str) -> Result<GeocodeMatch, GeocodeError> {
        GeocodingClient::resolve(self, place_name).await
    }
}

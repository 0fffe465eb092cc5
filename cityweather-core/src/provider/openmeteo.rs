use async_trait::async_trait;
use reqwest::{Client, header::CACHE_CONTROL};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::{config::ForecastConfig, error::ForecastError, provider::truncate_body};

use super::ForecastSource;

/// Current-conditions fetch against an Open-Meteo compatible forecast endpoint.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    endpoint: String,
    extra_query: BTreeMap<String, String>,
    max_stale_secs: Option<u64>,
    http: Client,
}

impl ForecastClient {
    pub fn new(endpoint: String) -> Self {
        Self::from_config(&ForecastConfig {
            endpoint,
            ..ForecastConfig::default()
        })
    }

    pub fn from_config(config: &ForecastConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            extra_query: config.extra_query.clone(),
            max_stale_secs: (config.max_stale_secs > 0).then_some(config.max_stale_secs),
            http: Client::new(),
        }
    }

    pub async fn fetch_current_temperature(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> Result<String, ForecastError> {
        tracing::debug!(latitude, longitude, endpoint = %self.endpoint, "forecast request");

        let mut req = self
            .http
            .get(&self.endpoint)
            .query(&[("latitude", latitude), ("longitude", longitude)])
            .query(&self.extra_query);

        if let Some(secs) = self.max_stale_secs {
            req = req.header(CACHE_CONTROL, format!("max-stale={secs}"));
        }

        let res = req.send().await.map_err(ForecastError::Network)?;

        let status = res.status();
        let body = res.text().await.map_err(ForecastError::Network)?;

        if !status.is_success() {
            return Err(ForecastError::Server {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: OmResponse = serde_json::from_str(&body)
            .map_err(|e| ForecastError::MalformedResponse(e.to_string()))?;

        display_temperature(parsed.current_weather.temperature)
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    // Null and absent both decode to None.
    temperature: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current_weather: OmCurrentWeather,
}

/// The temperature is passed through as display text, without unit handling.
fn display_temperature(value: Option<serde_json::Value>) -> Result<String, ForecastError> {
    match value {
        None | Some(serde_json::Value::Null) => Err(ForecastError::MalformedResponse(
            "current_weather.temperature is missing".to_string(),
        )),
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(other) => Ok(other.to_string()),
    }
}

#[async_trait]
impl ForecastSource for ForecastClient {
    async fn fetch_current_temperature(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> Result<String, ForecastError> {
        ForecastClient::fetch_current_temperature(self, latitude, longitude).await
    }
}

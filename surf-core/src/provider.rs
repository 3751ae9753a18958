use crate::{
    Config, FetchError, Location, MarineReading,
    provider::{geocoding::OpenMeteoGeocoding, marine::OpenMeteoMarine},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc};

pub mod geocoding;
pub mod marine;

/// Name-based location lookup.
#[async_trait]
pub trait GeocodingProvider: Send + Sync + Debug {
    async fn search(&self, query: &str) -> Result<Vec<Location>, FetchError>;
}

/// Current marine conditions keyed by coordinates.
#[async_trait]
pub trait MarineProvider: Send + Sync + Debug {
    async fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<MarineReading, FetchError>;
}

/// Construct the geocoding provider described by `config`.
pub fn geocoding_from_config(config: &Config) -> Arc<dyn GeocodingProvider> {
    Arc::new(OpenMeteoGeocoding::new(
        config.geocoding.endpoint.clone(),
        config.geocoding.count,
        config.geocoding.language.clone(),
    ))
}

/// Construct the marine provider described by `config`.
pub fn marine_from_config(config: &Config) -> Arc<dyn MarineProvider> {
    Arc::new(OpenMeteoMarine::new(config.marine.endpoint.clone()))
}

/// Body Open-Meteo sends along with a 4xx status.
#[derive(Debug, Deserialize)]
struct ApiError {
    reason: String,
}

/// GET `url` and return the body of a successful response.
pub(crate) async fn fetch_body(
    http: &Client,
    service: &'static str,
    url: &str,
    query: &[(&str, String)],
) -> Result<String, FetchError> {
    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| FetchError::Transport { service, source })?;

    let status = res.status();
    let body = res.text().await.map_err(|source| FetchError::Transport { service, source })?;

    if !status.is_success() {
        return Err(FetchError::Status { service, status, message: error_message(&body) });
    }

    Ok(body)
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(err) => err.reason,
        Err(_) => truncate_body(body),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

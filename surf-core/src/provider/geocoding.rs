use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::{FetchError, Location};

use super::{GeocodingProvider, fetch_body};

const SERVICE: &str = "Open-Meteo geocoding";

/// Open-Meteo name search.
#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoding {
    endpoint: String,
    count: u8,
    language: String,
    http: Client,
}

impl OpenMeteoGeocoding {
    pub fn new(endpoint: String, count: u8, language: String) -> Self {
        Self { endpoint, count, language, http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    // Omitted entirely when nothing matched.
    #[serde(default)]
    results: Vec<Location>,
}

pub(crate) fn parse_search_body(body: &str) -> Result<Vec<Location>, FetchError> {
    let parsed: GeoResponse = serde_json::from_str(body)
        .map_err(|source| FetchError::Parse { service: SERVICE, source })?;
    Ok(parsed.results)
}

#[async_trait]
impl GeocodingProvider for OpenMeteoGeocoding {
    async fn search(&self, query: &str) -> Result<Vec<Location>, FetchError> {
        info!(query, "searching locations");

        let body = fetch_body(
            &self.http,
            SERVICE,
            &self.endpoint,
            &[
                ("name", query.to_string()),
                ("count", self.count.to_string()),
                ("language", self.language.clone()),
                ("format", "json".to_string()),
            ],
        )
        .await?;

        parse_search_body(&body)
    }
}

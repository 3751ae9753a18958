use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::{FetchError, MarineReading, Measurement};

use super::{MarineProvider, fetch_body};

const SERVICE: &str = "Open-Meteo marine";
const CURRENT_FIELDS: &str = "wave_height,sea_surface_temperature";

/// Open-Meteo marine forecast, current conditions only.
#[derive(Debug, Clone)]
pub struct OpenMeteoMarine {
    endpoint: String,
    http: Client,
}

impl OpenMeteoMarine {
    pub fn new(endpoint: String) -> Self {
        Self { endpoint, http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct MarineCurrent {
    time: String,
    #[serde(default)]
    wave_height: Option<f64>,
    #[serde(default)]
    sea_surface_temperature: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct MarineUnits {
    #[serde(default)]
    wave_height: Option<String>,
    #[serde(default)]
    sea_surface_temperature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MarineResponse {
    current: MarineCurrent,
    #[serde(default)]
    current_units: MarineUnits,
}

fn parse_time(value: &str) -> Result<NaiveDateTime, FetchError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|source| FetchError::Timestamp {
            service: SERVICE,
            value: value.to_string(),
            source,
        })
}

pub(crate) fn parse_marine_body(body: &str) -> Result<MarineReading, FetchError> {
    let parsed: MarineResponse = serde_json::from_str(body)
        .map_err(|source| FetchError::Parse { service: SERVICE, source })?;

    let units = &parsed.current_units;

    Ok(MarineReading {
        wave_height: Measurement::from_parts(
            parsed.current.wave_height,
            units.wave_height.as_deref(),
        ),
        sea_surface_temperature: Measurement::from_parts(
            parsed.current.sea_surface_temperature,
            units.sea_surface_temperature.as_deref(),
        ),
        observation_time: parse_time(&parsed.current.time)?,
    })
}

#[async_trait]
impl MarineProvider for OpenMeteoMarine {
    async fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<MarineReading, FetchError> {
        info!(latitude, longitude, "fetching marine conditions");

        let body = fetch_body(
            &self.http,
            SERVICE,
            &self.endpoint,
            &[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
            ],
        )
        .await?;

        parse_marine_body(&body)
    }
}

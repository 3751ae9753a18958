use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A place returned by the geocoding lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Identity of a candidate within a result list.
    pub fn key(&self) -> String {
        format!("{}-{}", self.latitude, self.longitude)
    }

    /// "San Diego, United States", or just the name when the country is unknown.
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// A single marine measurement. The upstream service omits fields it has no
/// data for, which is a normal outcome and not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Measurement {
    Present { value: f64, unit: String },
    Absent,
}

impl Measurement {
    pub fn from_parts(value: Option<f64>, unit: Option<&str>) -> Self {
        match value {
            Some(value) => Measurement::Present {
                value,
                unit: unit.unwrap_or_default().to_string(),
            },
            None => Measurement::Absent,
        }
    }
}

/// Current marine conditions for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarineReading {
    pub wave_height: Measurement,
    pub sea_surface_temperature: Measurement,
    /// GMT, as reported by the marine service.
    pub observation_time: NaiveDateTime,
}

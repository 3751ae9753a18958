//! Plain-text presentation of the view-state.

use std::fmt;

use crate::{
    Location, MarineReading, Measurement,
    store::{DetailState, SearchState},
};

pub const TITLE: &str = "Surf Report";
pub const SUBTITLE: &str = "Search for a location to get the surf report";
pub const NO_RESULTS: &str = "No locations found";
pub const MARINE_FAILED: &str = "Failed to load marine data";

/// Rows shown while a search is in flight.
pub const LOADING_PLACEHOLDERS: usize = 3;

const PLACEHOLDER_ROW: &str = "░░░░░░░░░░░░  ░░░░░░░░░░";

/// What the area under the search input shows.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchArea<'a> {
    Loading { placeholders: usize },
    Results(&'a [Location]),
    NoResults,
    Nothing,
}

impl<'a> SearchArea<'a> {
    pub fn from_state(state: &'a SearchState, min_query_len: usize) -> Self {
        if state.loading {
            SearchArea::Loading { placeholders: LOADING_PLACEHOLDERS }
        } else if !state.candidates.is_empty() {
            SearchArea::Results(&state.candidates)
        } else if state.query.chars().count() >= min_query_len {
            SearchArea::NoResults
        } else {
            SearchArea::Nothing
        }
    }
}

impl fmt::Display for SearchArea<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchArea::Loading { placeholders } => {
                for _ in 0..*placeholders {
                    writeln!(f, "{PLACEHOLDER_ROW}")?;
                }
                Ok(())
            }
            SearchArea::Results(candidates) => {
                for location in candidates.iter() {
                    writeln!(f, "{}", candidate_row(location))?;
                }
                Ok(())
            }
            SearchArea::NoResults => writeln!(f, "{NO_RESULTS}"),
            SearchArea::Nothing => Ok(()),
        }
    }
}

/// One line per candidate: label, then coordinates to two decimals.
pub fn candidate_row(location: &Location) -> String {
    format!("{}  {}", location.label(), coordinates(location))
}

pub fn coordinates(location: &Location) -> String {
    format!("{:.2}°, {:.2}°", location.latitude, location.longitude)
}

/// The marine detail region, present only while a candidate is selected.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailPane<'a> {
    Hidden,
    Loading(&'a Location),
    Loaded(&'a Location, &'a MarineReading),
    Failed(&'a Location),
}

impl<'a> DetailPane<'a> {
    pub fn from_state(state: &'a DetailState) -> Self {
        match state {
            DetailState::Idle => DetailPane::Hidden,
            DetailState::Loading { location } => DetailPane::Loading(location),
            DetailState::Loaded { location, reading } => DetailPane::Loaded(location, reading),
            DetailState::Failed { location } => DetailPane::Failed(location),
        }
    }
}

impl fmt::Display for DetailPane<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailPane::Hidden => Ok(()),
            DetailPane::Loading(location) => {
                writeln!(f, "{}", location.label())?;
                writeln!(f, "Loading marine data...")
            }
            DetailPane::Loaded(location, reading) => {
                writeln!(f, "{}", location.label())?;
                for line in reading_lines(reading) {
                    writeln!(f, "{line}")?;
                }
                Ok(())
            }
            DetailPane::Failed(location) => {
                writeln!(f, "{}", location.label())?;
                writeln!(f, "{MARINE_FAILED}")
            }
        }
    }
}

/// Card body for a reading; each measurement is rendered on its own.
pub fn reading_lines(reading: &MarineReading) -> Vec<String> {
    vec![
        measurement_line("Wave Height", "Wave height", &reading.wave_height),
        measurement_line(
            "Sea Surface Temperature",
            "Sea surface temperature",
            &reading.sea_surface_temperature,
        ),
        format!("Observed: {} GMT", reading.observation_time.format("%Y-%m-%d %H:%M")),
    ]
}

fn measurement_line(title: &str, field: &str, measurement: &Measurement) -> String {
    match measurement {
        Measurement::Present { value, unit } => format!("{title}: {value}{unit}"),
        Measurement::Absent => format!("{field} data not available for this location"),
    }
}

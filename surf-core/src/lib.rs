//! Core library for the `surf` report.
//!
//! This crate defines:
//! - Configuration handling
//! - Open-Meteo geocoding and marine clients behind provider traits
//! - The search/detail view-state, its store and the session driving it
//! - Plain-text rendering of that state
//!
//! It is used by `surf-cli`, but can also be reused by other front ends.

pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod model;
pub mod provider;
pub mod render;
pub mod session;
pub mod store;

pub use config::{Config, SearchSettings};
pub use error::FetchError;
pub use model::{Location, MarineReading, Measurement};
pub use provider::{GeocodingProvider, MarineProvider};
pub use session::Session;
pub use store::{Action, DetailState, SearchState, ViewState};

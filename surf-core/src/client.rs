//! Client boundary: provider failures are logged here and downgraded to the
//! state the view can show.

use std::sync::Arc;

use tracing::{debug, error};

use crate::{FetchError, GeocodingProvider, Location, MarineProvider, MarineReading};

/// Location search that never fails: transport and parse errors come back
/// as an empty candidate list.
#[derive(Debug, Clone)]
pub struct LocationSearch {
    provider: Arc<dyn GeocodingProvider>,
    min_query_len: usize,
}

impl LocationSearch {
    pub fn new(provider: Arc<dyn GeocodingProvider>, min_query_len: usize) -> Self {
        Self { provider, min_query_len }
    }

    pub async fn search(&self, query: &str) -> Vec<Location> {
        if query.chars().count() < self.min_query_len {
            debug!(query, "query below minimum length, not searching");
            return Vec::new();
        }

        match self.provider.search(query).await {
            Ok(results) => {
                debug!(query, count = results.len(), "location search finished");
                results
            }
            Err(err) => {
                error!(query, service = err.service(), "Failed to fetch locations: {err}");
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarineDetail {
    provider: Arc<dyn MarineProvider>,
}

impl MarineDetail {
    pub fn new(provider: Arc<dyn MarineProvider>) -> Self {
        Self { provider }
    }

    pub async fn fetch(&self, location: &Location) -> Result<MarineReading, FetchError> {
        self.provider
            .current_conditions(location.latitude, location.longitude)
            .await
            .inspect_err(|err| {
                error!(
                    location = %location.label(),
                    service = err.service(),
                    "Failed to fetch marine data: {err}"
                );
            })
    }
}

//! Failures of the outbound lookups.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to send request to {service}: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} request failed with status {status}: {message}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("failed to parse {service} response: {source}")]
    Parse {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{service} response has invalid timestamp '{value}'")]
    Timestamp {
        service: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl FetchError {
    pub fn service(&self) -> &'static str {
        match self {
            FetchError::Transport { service, .. }
            | FetchError::Status { service, .. }
            | FetchError::Parse { service, .. }
            | FetchError::Timestamp { service, .. } => service,
        }
    }
}

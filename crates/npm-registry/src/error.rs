//! Error types for npm-registry.

use thiserror::Error;

/// Failures of the registry transport. The gateway turns every one of them
/// into a terminal `Lookup::NotFound` for that name.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid registry url for {name}: {source}")]
    InvalidUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request for {name} failed: {source}")]
    Request {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("registry returned {status} for {name}")]
    Status {
        name: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// The registry answered, but the document is not a package document.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("registry document for {name} is malformed: {source}")]
    InvalidDocument {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("registry document for {0} is not a JSON object")]
    NotAnObject(String),
}

//! Registry transports.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::TransportError;

/// Everything except the characters npm keeps literal in a package name.
/// The scope separator is encoded, `@scope/name` becomes `@scope%2Fname`.
const PACKAGE_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'@')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw registry documents.
///
/// Implementations return `Ok(None)` when the registry does not know the
/// package. Retries and timeouts are the transport's business.
#[async_trait]
pub trait RegistryTransport: Send + Sync {
    async fn fetch_document(&self, name: &str) -> Result<Option<Value>, TransportError>;
}

/// Transport for npm compatible HTTP registries.
pub struct HttpTransport {
    client: reqwest::Client,
    registry: Url,
    auth_token: Option<String>,
}

impl HttpTransport {
    pub fn new(mut registry: Url, auth_token: Option<String>) -> Result<Self, TransportError> {
        // joining against a base without a trailing slash drops its last segment
        if !registry.path().ends_with('/') {
            let path = format!("{}/", registry.path());
            registry.set_path(&path);
        }
        // reqwest is built without a default provider; a second install is a no-op
        let _ = rustls::crypto::ring::default_provider().install_default();
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("upgrade-planner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self {
            client,
            registry,
            auth_token,
        })
    }

    pub fn registry(&self) -> &Url {
        &self.registry
    }

    fn document_url(&self, name: &str) -> Result<Url, TransportError> {
        let encoded = utf8_percent_encode(name, PACKAGE_NAME).to_string();
        self.registry
            .join(&encoded)
            .map_err(|source| TransportError::InvalidUrl {
                name: name.to_string(),
                source,
            })
    }
}

#[async_trait]
impl RegistryTransport for HttpTransport {
    async fn fetch_document(&self, name: &str) -> Result<Option<Value>, TransportError> {
        let url = self.document_url(name)?;
        debug!("fetching {}", url);

        // the abbreviated install document omits the update metadata, ask for the full one
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|source| TransportError::Request {
                name: name.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => {
                return Err(TransportError::Status {
                    name: name.to_string(),
                    status,
                })
            }
            _ => {}
        }

        let document = response
            .json::<Value>()
            .await
            .map_err(|source| TransportError::Request {
                name: name.to_string(),
                source,
            })?;
        Ok(Some(document))
    }
}

//! HTTP Remote Store - RemoteStore over the `/store` endpoint.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpRemoteStoreConfig::new("https://desk.example.com/api/store")
//!     .with_timeout(Duration::from_secs(10));
//!
//! let remote = HttpRemoteStore::new(config)?;
//! ```
//!
//! # Response handling
//!
//! Reads are lenient: a missing record or a body that is not a JSON object
//! means "no remote data". Writes are strict: anything but a 2xx JSON
//! acknowledgement is an error carrying the server's `details`/`error` text.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::StoreSnapshot;
use crate::ports::{RemoteStore, RemoteStoreError, SaveReceipt};

/// Error text the proxy returns when it has no backend configured.
const MISCONFIGURED_MARKER: &str = "Database configuration missing";

/// Configuration for the HTTP remote store.
#[derive(Debug, Clone)]
pub struct HttpRemoteStoreConfig {
    /// Full URL of the store endpoint.
    pub endpoint: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpRemoteStoreConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Error payload produced by the store proxy.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl ErrorBody {
    fn message(self, status: StatusCode) -> String {
        self.details
            .filter(|d| !d.is_empty())
            .or(self.error)
            .unwrap_or_else(|| status.to_string())
    }
}

/// Remote store client talking JSON over HTTP.
pub struct HttpRemoteStore {
    config: HttpRemoteStoreConfig,
    client: Client,
}

impl HttpRemoteStore {
    /// Creates the client.
    ///
    /// # Errors
    /// Returns `Misconfigured` when the HTTP client cannot be built.
    pub fn new(config: HttpRemoteStoreConfig) -> Result<Self, RemoteStoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteStoreError::Misconfigured(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Maps a non-2xx response to an error, reading the proxy's error body.
    async fn error_from(response: Response) -> RemoteStoreError {
        let status = response.status();
        let body: ErrorBody = response.json().await.unwrap_or_default();

        if status == StatusCode::INTERNAL_SERVER_ERROR
            && body.error.as_deref() == Some(MISCONFIGURED_MARKER)
        {
            return RemoteStoreError::Misconfigured(body.message(status));
        }

        RemoteStoreError::Rejected {
            status: status.as_u16(),
            message: body.message(status),
        }
    }
}

fn transport_error(e: reqwest::Error) -> RemoteStoreError {
    RemoteStoreError::Unreachable(e.to_string())
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn load(&self) -> Result<Option<StoreSnapshot>, RemoteStoreError> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::error_from(response).await);
        }

        let text = response.text().await.map_err(transport_error)?;
        match StoreSnapshot::from_json(&text) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                tracing::warn!(error = %e, "Remote store returned no usable data");
                Ok(None)
            }
        }
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<SaveReceipt, RemoteStoreError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(snapshot)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let receipt: SaveReceipt = response
            .json()
            .await
            .map_err(|e| RemoteStoreError::InvalidResponse(e.to_string()))?;

        if !receipt.success {
            return Err(RemoteStoreError::InvalidResponse(
                "upload was not acknowledged".to_string(),
            ));
        }
        Ok(receipt)
    }

    async fn clear(&self) -> Result<(), RemoteStoreError> {
        let response = self
            .client
            .delete(&self.config.endpoint)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }
}

//! Upstream source of the identity provider's signing keys.
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use thiserror::Error;
use url::Url;

use crate::services::auth::keys::SigningKeySet;

/// Key fetch failures. The key provider never surfaces these to requests; it
/// logs them and falls back to the last known-good set.
#[derive(Debug, Error)]
pub enum KeySourceError {
    #[error("key set request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("key set endpoint responded with status {0}")]
    Status(u16),
    #[error("key set document could not be decoded: {0}")]
    Decode(String),
    #[error("key set document contains no usable signing keys")]
    NoUsableKeys,
    #[error("key set fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Read-only fetch of the current signing key set.
///
/// Implementations must be safe to call concurrently; the provider makes sure
/// only one call is in flight at a time.
#[async_trait]
pub trait KeySource: Send + Sync + 'static {
    // Human readable location (for logs).
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<SigningKeySet, KeySourceError>;
}

/// Fetches a JWKS document over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpKeySource {
    client: reqwest::Client,
    url: Url,
}

impl HttpKeySource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, KeySourceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Result<SigningKeySet, KeySourceError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeySourceError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let jwks: JwkSet =
            serde_json::from_slice(&body).map_err(|e| KeySourceError::Decode(e.to_string()))?;

        let keys = SigningKeySet::from_jwks(&jwks);
        if keys.is_empty() {
            return Err(KeySourceError::NoUsableKeys);
        }

        Ok(keys)
    }
}

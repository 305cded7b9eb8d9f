use std::sync::Arc;

use tracing::debug;

use crate::services::auth::error::AuthError;
use crate::services::auth::identity::VerifiedIdentity;
use crate::services::auth::key_provider::KeyProvider;
use crate::services::auth::verifier::TokenVerifier;

/// Verifies bearer tokens against the provider's current key set.
///
/// An unknown `kid` triggers exactly one forced key refresh followed by one
/// re-verification. Nothing else is retried.
#[derive(Debug)]
pub struct Authenticator {
    keys: Arc<KeyProvider>,
    verifier: TokenVerifier,
}

impl Authenticator {
    pub fn new(keys: Arc<KeyProvider>, verifier: TokenVerifier) -> Self {
        Self { keys, verifier }
    }

    pub fn key_provider(&self) -> &Arc<KeyProvider> {
        &self.keys
    }

    pub async fn authenticate(&self, raw_token: &str) -> Result<VerifiedIdentity, AuthError> {
        let keys = self.keys.current_key_set().await?;

        match self.verifier.verify(raw_token, &keys) {
            Err(AuthError::UnknownSigningKey { kid }) => {
                debug!(kid = %kid, "unknown signing key, refreshing key set once");
                let refreshed = self.keys.refresh_after_miss(&keys).await?;
                self.verifier.verify(raw_token, &refreshed)
            }
            other => other,
        }
    }
}

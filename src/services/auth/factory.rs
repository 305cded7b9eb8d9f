/// Factory: build the `Authenticator` from application `AuthSettings`.
use std::sync::Arc;

use crate::config::AuthSettings;
use crate::services::auth::{
    Authenticator, ExpectedClaims, HttpKeySource, KeyCachePolicy, KeyProvider, KeySourceError,
    TokenVerifier,
};

pub fn build_authenticator(settings: &AuthSettings) -> Result<Arc<Authenticator>, KeySourceError> {
    let source = HttpKeySource::new(settings.jwks_url.clone(), settings.keys_fetch_timeout)?;

    let keys = KeyProvider::new(
        Arc::new(source),
        KeyCachePolicy {
            validity: settings.keys_ttl,
            fetch_timeout: settings.keys_fetch_timeout,
            forced_refresh_cooldown: settings.keys_refresh_cooldown,
            retry_backoff: settings.keys_retry_backoff,
        },
    );

    let verifier = TokenVerifier::new(ExpectedClaims {
        issuer: settings.issuer.clone(),
        audience: settings.audience.clone(),
        purpose: settings.token_use,
        leeway_seconds: settings.leeway_seconds,
    });

    Ok(Arc::new(Authenticator::new(Arc::new(keys), verifier)))
}

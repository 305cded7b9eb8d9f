//! Bearer token verification → VerifiedIdentity in request extensions
//!
//! - `Authorization: Bearer <jwt>` is verified by the `Authenticator`
//!   (signature, exp, iss, aud, token_use; one key refresh on an unknown kid).
//! - On success the identity is attached with `with_identity` and the request
//!   continues. On any failure the pipeline stops here and the handler never runs.
//! - Paths in the configured allowlist skip verification entirely.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::identity::with_identity;
use crate::error::AppError;
use crate::services::auth::{AuthError, Authenticator};

/// Shared state of the identity middleware.
#[derive(Clone)]
pub struct AccessGate {
    auth: Arc<Authenticator>,
    public_paths: Arc<HashSet<String>>,
}

impl AccessGate {
    pub fn new(auth: Arc<Authenticator>, public_paths: impl IntoIterator<Item = String>) -> Self {
        Self {
            auth,
            public_paths: Arc::new(public_paths.into_iter().collect()),
        }
    }

    fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(path)
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("public_paths", &self.public_paths)
            .finish_non_exhaustive()
    }
}

/// Put the identity middleware in front of every route of `router`.
///
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, gate);
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply<S>(router: Router<S>, gate: AccessGate) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(gate, access_middleware))
}

async fn access_middleware(
    State(gate): State<AccessGate>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Nested routers see a stripped uri; match the allowlist on what the client sent.
    let public = match req.extensions().get::<OriginalUri>() {
        Some(OriginalUri(uri)) => gate.is_public(uri.path()),
        None => gate.is_public(req.uri().path()),
    };
    if public {
        return Ok(next.run(req).await);
    }

    let token = match bearer_token(req.headers()) {
        Ok(token) => token.to_owned(),
        Err(err) => {
            tracing::warn!(kind = err.kind(), path = %req.uri().path(), "request rejected");
            return Err(err.into());
        }
    };

    let identity = match gate.auth.authenticate(&token).await {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!(
                kind = err.kind(),
                error = %err,
                path = %req.uri().path(),
                "access token verification failed"
            );
            return Err(err.into());
        }
    };

    tracing::debug!(user_id = %identity.user_id, "request authenticated");

    let req = with_identity(req, identity);
    Ok(next.run(req).await)
}

/// `Authorization: Bearer <token>`; the scheme is case-insensitive.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MissingCredentials)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MissingCredentials);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(token)
}

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::types::identity;
use crate::error::AppError;
use crate::services::auth::VerifiedIdentity;

/// Handler-side view of the verified caller.
///
/// The identity middleware must have run. A missing identity is a wiring
/// defect, so it is rejected with 500 rather than 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub VerifiedIdentity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match identity(&parts.extensions) {
            Some(found) => Ok(CurrentUser(found.clone())),
            None => {
                tracing::error!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    "verified identity missing from request context"
                );
                Err(AppError::MissingContextIdentity)
            }
        }
    }
}

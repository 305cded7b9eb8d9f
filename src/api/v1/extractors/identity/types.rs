/*
 * Responsibility
 * - Request-scoped slot for the VerifiedIdentity
 * - Only the identity middleware writes it; nothing reads the token again downstream
 */
use axum::body::Body;
use axum::http::{Extensions, Request};

use crate::services::auth::VerifiedIdentity;

/// Returns the request with `identity` attached.
///
/// Takes the request by value so the caller hands over the one it will forward.
pub fn with_identity(mut req: Request<Body>, identity: VerifiedIdentity) -> Request<Body> {
    req.extensions_mut().insert(identity);
    req
}

/// The identity attached by the middleware, if it ran.
pub fn identity(extensions: &Extensions) -> Option<&VerifiedIdentity> {
    extensions.get::<VerifiedIdentity>()
}

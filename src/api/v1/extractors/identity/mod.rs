/*!
 * Verified identity carried on the request
 *
 * Responsibility:
 * - middleware attaches the VerifiedIdentity, handlers read it back
 * - HTTP / axum extractor lives in core, the carrier functions in types
 *
 * Public API:
 * - with_identity / identity
 * - CurrentUser
 */

mod core;
mod types;

pub use core::CurrentUser;
pub use types::{identity, with_identity};

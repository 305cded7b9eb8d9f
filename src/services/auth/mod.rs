pub mod authenticator;
pub mod error;
pub mod factory;
pub mod identity;
pub mod key_provider;
pub mod key_source;
pub mod keys;
pub mod token;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use authenticator::Authenticator;
pub use error::AuthError;
pub use factory::build_authenticator;
pub use identity::{UserId, VerifiedIdentity};
pub use key_provider::{KeyCachePolicy, KeyProvider};
pub use key_source::{HttpKeySource, KeySource, KeySourceError};
pub use keys::{SigningKey, SigningKeySet};
pub use verifier::{ExpectedClaims, TokenPurpose, TokenVerifier};

/*
 * Responsibility
 * - Authentication failure taxonomy shared by key provider, verifier and middleware
 * - The specific kind is for logs only; the HTTP layer collapses it (see AppError)
 */
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no signing keys have ever been obtained")]
    KeySourceUnavailable,
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),
    #[error("unknown signing key id: {kid}")]
    UnknownSigningKey { kid: String },
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    TokenExpired,
    #[error("issuer mismatch")]
    IssuerMismatch,
    #[error("audience mismatch")]
    AudienceMismatch,
    #[error("wrong token purpose")]
    WrongTokenPurpose,
    #[error("missing bearer credentials")]
    MissingCredentials,
}

impl AuthError {
    /// Stable identifier for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeySourceUnavailable => "key_source_unavailable",
            Self::MalformedToken(_) => "malformed_token",
            Self::UnknownSigningKey { .. } => "unknown_signing_key",
            Self::InvalidSignature => "invalid_signature",
            Self::TokenExpired => "token_expired",
            Self::IssuerMismatch => "issuer_mismatch",
            Self::AudienceMismatch => "audience_mismatch",
            Self::WrongTokenPurpose => "wrong_token_purpose",
            Self::MissingCredentials => "missing_credentials",
        }
    }
}

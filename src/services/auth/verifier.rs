//! Bearer token verification against a signing key set.
//!
//! Verification is a pure function of (token, key set, expectations, now):
//!
//! 1. structure: three base64url segments, JSON header with `kid` and `alg`
//! 2. key lookup by `kid` (`UnknownSigningKey` lets the caller refresh once)
//! 3. signature, using the algorithm pinned on the stored key
//! 4. claims, in order: `exp`, `iss`, audience, `token_use`
use std::str::FromStr;

use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};
use serde::Deserialize;

use crate::services::auth::error::AuthError;
use crate::services::auth::identity::{UserId, VerifiedIdentity};
use crate::services::auth::keys::{SigningKey, SigningKeySet};
use crate::services::auth::token::RawToken;

/// Which kind of token the API accepts (the `token_use` claim).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    Id,
    Access,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Access => "access",
        }
    }
}

impl FromStr for TokenPurpose {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "access" => Ok(Self::Access),
            _ => Err(()),
        }
    }
}

/// Statically configured expectations for every accepted token.
#[derive(Debug, Clone)]
pub struct ExpectedClaims {
    pub issuer: String,
    pub audience: String,
    pub purpose: TokenPurpose,
    // Clock-skew tolerance applied to `exp`.
    pub leeway_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// Decoded payload. Missing or mistyped required claims fail deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iss: String,
    #[serde(default)]
    pub aud: Option<Audience>,
    // Access tokens of the user pool carry the app client here instead of `aud`.
    #[serde(default)]
    pub client_id: Option<String>,
    pub exp: i64,
    pub iat: i64,
    pub token_use: String,
}

impl TokenClaims {
    fn audience_matches(&self, expected: &str) -> bool {
        match (&self.aud, &self.client_id) {
            (Some(Audience::One(aud)), _) => aud == expected,
            (Some(Audience::Many(auds)), _) => auds.iter().any(|aud| aud == expected),
            (None, Some(client_id)) => client_id == expected,
            (None, None) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenVerifier {
    expected: ExpectedClaims,
}

impl TokenVerifier {
    pub fn new(expected: ExpectedClaims) -> Self {
        Self { expected }
    }

    pub fn verify(&self, raw: &str, keys: &SigningKeySet) -> Result<VerifiedIdentity, AuthError> {
        self.verify_at(raw, keys, chrono::Utc::now().timestamp())
    }

    /// Verify at an explicit unix time (seconds).
    pub fn verify_at(
        &self,
        raw: &str,
        keys: &SigningKeySet,
        now: i64,
    ) -> Result<VerifiedIdentity, AuthError> {
        let token = RawToken::parse(raw)?;
        let header = token.header()?;

        let kid = header
            .kid
            .as_deref()
            .filter(|kid| !kid.is_empty())
            .ok_or(AuthError::MalformedToken("missing kid"))?;
        let declared = Algorithm::from_str(&header.alg)
            .map_err(|_| AuthError::MalformedToken("unsupported alg"))?;

        let key = keys.get(kid).ok_or_else(|| AuthError::UnknownSigningKey {
            kid: kid.to_string(),
        })?;

        // The stored key decides the algorithm; the header only has to agree.
        if declared != key.algorithm() {
            return Err(AuthError::InvalidSignature);
        }

        let payload = verify_signature(token, key)?;
        let claims: TokenClaims = serde_json::from_value(payload)
            .map_err(|_| AuthError::MalformedToken("required claim missing or mistyped"))?;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::MalformedToken("empty sub"));
        }

        self.validate_claims(&claims, now)?;

        Ok(VerifiedIdentity::new(UserId::new(claims.sub)))
    }

    fn validate_claims(&self, claims: &TokenClaims, now: i64) -> Result<(), AuthError> {
        let leeway = i64::try_from(self.expected.leeway_seconds).unwrap_or(i64::MAX);
        if claims.exp.saturating_add(leeway) <= now {
            return Err(AuthError::TokenExpired);
        }

        if claims.iss != self.expected.issuer {
            return Err(AuthError::IssuerMismatch);
        }

        if !claims.audience_matches(&self.expected.audience) {
            return Err(AuthError::AudienceMismatch);
        }

        if claims.token_use != self.expected.purpose.as_str() {
            return Err(AuthError::WrongTokenPurpose);
        }

        Ok(())
    }
}

// Signature only. Time and audience checks are ours, so jsonwebtoken's are disabled.
fn verify_signature(token: RawToken<'_>, key: &SigningKey) -> Result<serde_json::Value, AuthError> {
    let mut validation = Validation::new(key.algorithm());
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;

    jsonwebtoken::decode::<serde_json::Value>(token.as_str(), key.decoding_key(), &validation)
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_)
            | ErrorKind::InvalidToken => AuthError::MalformedToken("undecodable payload or signature"),
            _ => AuthError::InvalidSignature,
        })
}

//! Compact JWS structure: `base64url(header).base64url(payload).base64url(signature)`.
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;

use crate::services::auth::error::AuthError;

/// Decoded header segment.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default)]
    pub typ: Option<String>,
}

/// Bearer string split into its three segments. Borrowed from the request; never stored.
#[derive(Debug, Clone, Copy)]
pub struct RawToken<'a> {
    raw: &'a str,
    header: &'a str,
    payload: &'a str,
}

impl<'a> RawToken<'a> {
    /// Exactly three non-empty, base64url-shaped segments.
    pub fn parse(raw: &'a str) -> Result<Self, AuthError> {
        let mut segments = raw.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::MalformedToken("expected three segments"));
        };

        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(AuthError::MalformedToken("empty segment"));
        }

        if ![header, payload, signature]
            .iter()
            .all(|segment| segment.bytes().all(is_base64url))
        {
            return Err(AuthError::MalformedToken("segment is not base64url"));
        }

        Ok(Self {
            raw,
            header,
            payload,
        })
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    pub fn header(&self) -> Result<TokenHeader, AuthError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(self.header)
            .map_err(|_| AuthError::MalformedToken("header is not base64url"))?;

        serde_json::from_slice(&bytes)
            .map_err(|_| AuthError::MalformedToken("header is not a JWS header"))
    }

    pub fn payload_segment(&self) -> &'a str {
        self.payload
    }
}

fn is_base64url(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

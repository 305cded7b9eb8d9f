use std::fmt;

use serde::Serialize;

/// Opaque user identifier taken from the verified token subject.
///
/// It is the partition key for everything a user owns in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The only artifact that leaves the verification core.
///
/// Built per request by the verifier, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user_id: UserId,
}

impl VerifiedIdentity {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

//! Cached signing key set with single-flight refresh and stale fallback.
//!
//! - Fresh entries are served under a short read lock; readers never wait for a refresh.
//! - A miss or expiry takes the refresh lock. Callers that queued behind an attempt
//!   that already ran reuse its result instead of fetching again.
//! - A failed refresh keeps the previous set; only "never fetched" is an error.
//!   The stale set is then served as-is until the retry backoff has passed.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::services::auth::error::AuthError;
use crate::services::auth::key_source::{KeySource, KeySourceError};
use crate::services::auth::keys::SigningKeySet;

#[derive(Debug, Clone, Copy)]
pub struct KeyCachePolicy {
    // How long a fetched set is served without refreshing.
    pub validity: Duration,
    // Upper bound for one upstream fetch.
    pub fetch_timeout: Duration,
    // Minimum spacing between forced refreshes triggered by unknown key ids.
    pub forced_refresh_cooldown: Duration,
    // After a failed refresh, how long the stale set is served before fetching again.
    pub retry_backoff: Duration,
}

impl Default for KeyCachePolicy {
    fn default() -> Self {
        Self {
            validity: Duration::from_secs(3600),
            fetch_timeout: Duration::from_secs(3),
            forced_refresh_cooldown: Duration::from_secs(30),
            retry_backoff: Duration::from_secs(30),
        }
    }
}

struct CacheEntry {
    keys: Arc<SigningKeySet>,
    fetched_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entry: Option<CacheEntry>,
    // Completed fetch attempts (success or failure).
    attempts: u64,
    last_attempt: Option<Instant>,
    // Set when the latest attempt failed, cleared on success.
    last_failure: Option<Instant>,
}

impl CacheState {
    fn backing_off(&self, backoff: Duration) -> bool {
        self.last_failure
            .is_some_and(|failed_at| failed_at.elapsed() < backoff)
    }

    fn current(&self) -> Result<Arc<SigningKeySet>, AuthError> {
        self.entry
            .as_ref()
            .map(|entry| Arc::clone(&entry.keys))
            .ok_or(AuthError::KeySourceUnavailable)
    }
}

pub struct KeyProvider {
    source: Arc<dyn KeySource>,
    policy: KeyCachePolicy,
    state: RwLock<CacheState>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for KeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyProvider")
            .field("source", &self.source.describe())
            .field("policy", &self.policy)
            .finish()
    }
}

impl KeyProvider {
    pub fn new(source: Arc<dyn KeySource>, policy: KeyCachePolicy) -> Self {
        Self {
            source,
            policy,
            state: RwLock::new(CacheState::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Freshest known key set.
    ///
    /// Blocks only on a genuine miss or expiry, and then only until the single
    /// in-flight fetch resolves. An expired set whose refresh just failed is
    /// served without blocking until the retry backoff elapses.
    pub async fn current_key_set(&self) -> Result<Arc<SigningKeySet>, AuthError> {
        let observed = {
            let state = self.read_state();
            if let Some(entry) = &state.entry
                && (entry.fetched_at.elapsed() < self.policy.validity
                    || state.backing_off(self.policy.retry_backoff))
            {
                return Ok(Arc::clone(&entry.keys));
            }
            state.attempts
        };

        self.refresh(observed, None).await
    }

    /// Refresh after a token referenced a key id missing from `seen`.
    ///
    /// Skipped when another caller already replaced `seen`, or when the last
    /// attempt is younger than the forced refresh cooldown.
    pub async fn refresh_after_miss(
        &self,
        seen: &Arc<SigningKeySet>,
    ) -> Result<Arc<SigningKeySet>, AuthError> {
        let observed = self.read_state().attempts;
        self.refresh(observed, Some(seen)).await
    }

    async fn refresh(
        &self,
        observed_attempts: u64,
        seen: Option<&Arc<SigningKeySet>>,
    ) -> Result<Arc<SigningKeySet>, AuthError> {
        let _permit = self.refresh_lock.lock().await;

        {
            let state = self.read_state();

            if state.attempts != observed_attempts {
                // Someone else fetched while we were queued.
                return state.current();
            }

            if let Some(seen) = seen {
                if let Some(entry) = &state.entry
                    && !Arc::ptr_eq(seen, &entry.keys)
                {
                    return state.current();
                }
                if let Some(last) = state.last_attempt
                    && last.elapsed() < self.policy.forced_refresh_cooldown
                {
                    debug!("forced key refresh suppressed by cooldown");
                    return state.current();
                }
            }
        }

        let result = self.fetch().await;

        let mut state = self.write_state();
        state.attempts += 1;
        state.last_attempt = Some(Instant::now());

        match result {
            Ok(keys) => {
                state.last_failure = None;
                info!(
                    source = %self.source.describe(),
                    key_count = keys.len(),
                    kids = ?keys.key_ids().collect::<Vec<_>>(),
                    "signing keys refreshed"
                );
                state.entry = Some(CacheEntry {
                    keys: Arc::new(keys),
                    fetched_at: Instant::now(),
                });
            }
            Err(err) if state.entry.is_some() => {
                state.last_failure = state.last_attempt;
                warn!(
                    source = %self.source.describe(),
                    error = %err,
                    "signing key refresh failed, serving stale key set"
                );
            }
            Err(err) => {
                state.last_failure = state.last_attempt;
                warn!(
                    source = %self.source.describe(),
                    error = %err,
                    "signing key fetch failed and no key set is cached"
                );
            }
        }

        state.current()
    }

    async fn fetch(&self) -> Result<SigningKeySet, KeySourceError> {
        let timeout = self.policy.fetch_timeout;
        match tokio::time::timeout(timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(KeySourceError::Timeout(timeout)),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

//! Ephemeral store: session-scoped scratch state with optional expiry.
//!
//! Expiry is evaluated lazily at read time; there is no background sweeper.
//! An entry whose `expires_at` has passed is logically dead even while the
//! row still physically exists, and the first read after expiry removes it.
//! The removal uses `remove_if` keyed on the same expiry predicate, so
//! concurrent readers of an already-expired key race safely: losing the
//! delete race is a no-op, not an error.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use engram_core::{EngineConfig, EngramError, EngramResult, EphemeralEntry, JsonValue};

/// Composite key of a scratch entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SessionKey {
    session_id: String,
    key: String,
}

/// Store for short-term session state.
pub struct EphemeralStore {
    entries: DashMap<SessionKey, EphemeralEntry>,
    config: Arc<EngineConfig>,
}

impl EphemeralStore {
    /// Create an empty store with the given limits.
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            entries: DashMap::new(),
            config,
        }
    }

    /// Upsert a scratch value.
    ///
    /// With `ttl_seconds`, the entry expires at `now + ttl`; without it, the
    /// entry lives until overwritten or deleted. Overwriting replaces the
    /// whole row, including `created_at` and any previous expiry.
    pub fn set(
        &self,
        session_id: &str,
        key: &str,
        value: JsonValue,
        ttl_seconds: Option<u64>,
    ) -> EngramResult<()> {
        value.validate(self.config.max_value_bytes, self.config.max_value_depth)?;
        if ttl_seconds == Some(0) {
            return Err(EngramError::validation("ttl_seconds must be positive"));
        }

        let now = Utc::now();
        let expires_at = match ttl_seconds {
            // Checked end to end: the seconds conversion, the duration and
            // the resulting timestamp can each overflow for absurd TTLs.
            Some(secs) => {
                let at = i64::try_from(secs)
                    .ok()
                    .and_then(Duration::try_seconds)
                    .and_then(|ttl| now.checked_add_signed(ttl))
                    .ok_or_else(|| {
                        EngramError::validation(format!("ttl_seconds {} is too large", secs))
                    })?;
                Some(at)
            }
            None => None,
        };

        let entry = EphemeralEntry {
            session_id: session_id.to_string(),
            key: key.to_string(),
            value,
            created_at: now,
            expires_at,
        };
        self.entries.insert(
            SessionKey {
                session_id: session_id.to_string(),
                key: key.to_string(),
            },
            entry,
        );

        tracing::debug!(
            target: "engram::ephemeral",
            session = session_id,
            key,
            ttl = ?ttl_seconds,
            "set short-term value"
        );
        Ok(())
    }

    /// Read a scratch value, evaluating expiry at read time.
    ///
    /// An expired entry is removed as a side effect and reported as not
    /// found; once a key has expired, no later read can resurrect it.
    pub fn get(&self, session_id: &str, key: &str) -> EngramResult<JsonValue> {
        let session_key = SessionKey {
            session_id: session_id.to_string(),
            key: key.to_string(),
        };
        let now = Utc::now();

        let entry = match self.entries.get(&session_key) {
            Some(entry) => entry.value().clone(),
            None => {
                return Err(EngramError::not_found(format!(
                    "no short-term value {}/{}",
                    session_id, key
                )));
            }
        };

        if is_expired(&entry, now) {
            // Lazy delete. The predicate re-checks expiry so a concurrent
            // overwrite with a fresh TTL is never removed by a stale reader.
            self.entries
                .remove_if(&session_key, |_, current| is_expired(current, now));
            tracing::debug!(
                target: "engram::ephemeral",
                session = session_id,
                key,
                "expired short-term value removed on read"
            );
            return Err(EngramError::not_found(format!(
                "short-term value {}/{} expired",
                session_id, key
            )));
        }

        Ok(entry.value)
    }

    /// Delete a scratch value explicitly.
    pub fn delete(&self, session_id: &str, key: &str) -> EngramResult<()> {
        let session_key = SessionKey {
            session_id: session_id.to_string(),
            key: key.to_string(),
        };
        match self.entries.remove(&session_key) {
            Some(_) => Ok(()),
            None => Err(EngramError::not_found(format!(
                "no short-term value {}/{}",
                session_id, key
            ))),
        }
    }

    /// Drop every entry of a session. Returns the number removed.
    ///
    /// Counted inside the retain predicate, not as a length diff, so writers
    /// landing concurrently with the sweep cannot skew the count.
    pub fn clear_session(&self, session_id: &str) -> usize {
        let removed = AtomicUsize::new(0);
        self.entries.retain(|k, _| {
            if k.session_id == session_id {
                removed.fetch_add(1, Ordering::Relaxed);
                false
            } else {
                true
            }
        });
        let removed = removed.into_inner();
        if removed > 0 {
            tracing::debug!(
                target: "engram::ephemeral",
                session = session_id,
                removed,
                "cleared session"
            );
        }
        removed
    }
}

fn is_expired(entry: &EphemeralEntry, now: DateTime<Utc>) -> bool {
    entry.expires_at.map_or(false, |at| at <= now)
}

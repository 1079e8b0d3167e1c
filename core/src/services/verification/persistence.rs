//! Email-scoped persistence of the session timer anchors
//!
//! Two keys are kept per email:
//! - `{prefix}code_issued_at:{email}` - when the current code was issued
//! - `{prefix}resend_cooldown_until:{email}` - when resend becomes available
//!
//! Values are Unix epoch milliseconds. The first storage failure switches the
//! store to memory-only mode for the rest of its life.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use cg_shared::validation::mask_email;

use super::traits::DurableStorage;
use crate::errors::StorageError;

const CODE_ISSUED_AT_KEY: &str = "code_issued_at";
const RESEND_COOLDOWN_UNTIL_KEY: &str = "resend_cooldown_until";

/// Defensive wrapper around an optional [`DurableStorage`]
pub struct SessionStore {
    backend: Option<Arc<dyn DurableStorage>>,
    degraded: AtomicBool,
    prefix: String,
}

impl SessionStore {
    pub fn new(backend: Option<Arc<dyn DurableStorage>>, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            degraded: AtomicBool::new(false),
            prefix: prefix.into(),
        }
    }

    /// A store that never persists anything
    pub fn memory_only() -> Self {
        Self::new(None, "")
    }

    /// Whether values are currently reaching durable storage
    pub fn is_available(&self) -> bool {
        self.backend.is_some() && !self.degraded.load(Ordering::Relaxed)
    }

    pub fn code_issued_at_key(&self, email: &str) -> String {
        format!("{}{}:{}", self.prefix, CODE_ISSUED_AT_KEY, email)
    }

    pub fn resend_cooldown_until_key(&self, email: &str) -> String {
        format!("{}{}:{}", self.prefix, RESEND_COOLDOWN_UNTIL_KEY, email)
    }

    pub fn load_code_issued_at(&self, email: &str) -> Option<DateTime<Utc>> {
        self.load_instant(&self.code_issued_at_key(email))
    }

    pub fn save_code_issued_at(&self, email: &str, at: DateTime<Utc>) {
        self.save_instant(&self.code_issued_at_key(email), at);
    }

    pub fn load_resend_cooldown_until(&self, email: &str) -> Option<DateTime<Utc>> {
        self.load_instant(&self.resend_cooldown_until_key(email))
    }

    pub fn save_resend_cooldown_until(&self, email: &str, until: DateTime<Utc>) {
        self.save_instant(&self.resend_cooldown_until_key(email), until);
    }

    /// Remove every key belonging to `email`
    pub fn clear(&self, email: &str) {
        debug!(email = %mask_email(email), event = "session_storage_cleared", "Clearing persisted session timers");
        self.remove(&self.code_issued_at_key(email));
        self.remove(&self.resend_cooldown_until_key(email));
    }

    fn load_instant(&self, key: &str) -> Option<DateTime<Utc>> {
        let backend = self.usable_backend()?;
        let raw = match backend.get(key) {
            Ok(value) => value?,
            Err(e) => {
                self.degrade(&e);
                return None;
            }
        };

        let parsed = raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single());

        if parsed.is_none() {
            warn!(key = key, event = "storage_value_corrupt", "Discarding unparsable timer value");
            self.remove(key);
        }
        parsed
    }

    fn save_instant(&self, key: &str, at: DateTime<Utc>) {
        if let Some(backend) = self.usable_backend() {
            if let Err(e) = backend.set(key, &at.timestamp_millis().to_string()) {
                self.degrade(&e);
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(backend) = self.usable_backend() {
            if let Err(e) = backend.remove(key) {
                self.degrade(&e);
            }
        }
    }

    fn usable_backend(&self) -> Option<&Arc<dyn DurableStorage>> {
        if self.degraded.load(Ordering::Relaxed) {
            return None;
        }
        self.backend.as_ref()
    }

    fn degrade(&self, error: &StorageError) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            warn!(
                error = %error,
                event = "storage_degraded",
                "Durable storage unavailable, continuing with in-memory timers"
            );
        }
    }
}

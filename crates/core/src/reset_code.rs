//! Time-limited password-reset codes.
//!
//! Codes live in process memory, keyed by normalised email, and do not
//! survive a restart or scale across server instances. Every operation takes
//! the current time explicitly so expiry can be exercised deterministically.

use std::collections::HashMap;

use chrono::Duration;
use rand::Rng;
use tokio::sync::RwLock;

use crate::types::Timestamp;

/// Lifetime of a freshly issued reset code.
pub const DEFAULT_RESET_CODE_TTL_MINS: i64 = 15;

/// Wrong guesses allowed before a code is discarded.
pub const MAX_RESET_CODE_ATTEMPTS: u32 = 5;

/// Generate a random 6-digit numeric code.
pub fn generate_reset_code() -> String {
    rand::rng().random_range(100_000..1_000_000u32).to_string()
}

/// Canonical form used for email lookups: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone)]
struct ResetCode {
    code: String,
    expires_at: Timestamp,
    failed_attempts: u32,
}

/// In-memory store of outstanding reset codes, one per email.
#[derive(Debug)]
pub struct ResetCodeStore {
    ttl: Duration,
    codes: RwLock<HashMap<String, ResetCode>>,
}

impl Default for ResetCodeStore {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_RESET_CODE_TTL_MINS))
    }
}

impl ResetCodeStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            codes: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate and store a new code for `email`, replacing any previous one.
    pub async fn issue(&self, email: &str, now: Timestamp) -> String {
        let code = generate_reset_code();
        self.insert(email, &code, now).await;
        code
    }

    /// Store `code` for `email`, expiring `ttl` after `now`.
    pub async fn insert(&self, email: &str, code: &str, now: Timestamp) {
        let entry = ResetCode {
            code: code.to_string(),
            expires_at: now + self.ttl,
            failed_attempts: 0,
        };
        self.codes
            .write()
            .await
            .insert(normalize_email(email), entry);
    }

    /// Check `code` against the stored code for `email`.
    ///
    /// An expired entry is removed as a side effect and reported as invalid,
    /// as is an entry after [`MAX_RESET_CODE_ATTEMPTS`] wrong guesses.
    pub async fn verify(&self, email: &str, code: &str, now: Timestamp) -> bool {
        let key = normalize_email(email);
        let mut codes = self.codes.write().await;
        let Some(entry) = codes.get_mut(&key) else {
            return false;
        };
        if now > entry.expires_at {
            codes.remove(&key);
            return false;
        }
        if entry.code == code.trim() {
            return true;
        }
        entry.failed_attempts += 1;
        if entry.failed_attempts >= MAX_RESET_CODE_ATTEMPTS {
            codes.remove(&key);
        }
        false
    }

    /// Drop the code for `email`, if any.
    pub async fn remove(&self, email: &str) {
        self.codes.write().await.remove(&normalize_email(email));
    }

    /// Remove every expired entry, returning how many were dropped.
    pub async fn sweep_expired(&self, now: Timestamp) -> usize {
        let mut codes = self.codes.write().await;
        let before = codes.len();
        codes.retain(|_, entry| now <= entry.expires_at);
        before - codes.len()
    }

    pub async fn len(&self) -> usize {
        self.codes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.codes.read().await.is_empty()
    }
}

//! Client-side registry of login sessions.
//!
//! Each successful login creates a [`Session`] with its own token, refresh
//! secret and sliding four-day expiry. The registry is keyed by token, holds
//! sessions for any number of users and devices, and is written to
//! [`LocalStorage`] as a whole after every mutation.
//!
//! A lookup miss always means "not authenticated"; nothing here returns an
//! error to the caller. Persistence failures are logged and the in-memory
//! registry stays authoritative for the life of the process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Duration, Utc};
use emerald_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::{LocalStorage, SESSIONS_KEY};
use crate::user_agent::{self, DeviceType};

/// Sliding validity window of a session, in days.
pub const SESSION_WINDOW_DAYS: i64 = 4;
/// A session is "expiring" once this many minutes from `expires_at`.
pub const EXPIRY_WARNING_MINS: i64 = 30;

pub fn session_window() -> Duration {
    Duration::days(SESSION_WINDOW_DAYS)
}

pub fn expiry_warning() -> Duration {
    Duration::minutes(EXPIRY_WARNING_MINS)
}

const UNKNOWN_LOCATION: &str = "Unknown";

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub user_agent: String,
    pub ip: String,
    pub location: String,
    pub device_type: DeviceType,
    pub browser: String,
    pub os: String,
}

impl DeviceInfo {
    /// Derive device type, browser and OS from `user_agent`. Location starts
    /// out unknown.
    pub fn detect(user_agent: &str, ip: &str) -> Self {
        let parsed = user_agent::parse(user_agent);
        Self {
            user_agent: user_agent.to_string(),
            ip: ip.to_string(),
            location: UNKNOWN_LOCATION.to_string(),
            device_type: parsed.device_type,
            browser: parsed.browser.to_string(),
            os: parsed.os.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: DbId,
    pub refresh_token: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub last_activity: Timestamp,
    pub device_info: DeviceInfo,
}

impl Session {
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }

    pub fn is_expiring_at(&self, now: Timestamp) -> bool {
        now > self.expires_at - expiry_warning()
    }
}

pub struct SessionManager {
    storage: Arc<LocalStorage>,
    clock: Arc<dyn Clock>,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionManager {
    /// Load the registry from `storage`. An unreadable registry is logged
    /// and replaced with an empty one.
    pub fn load(storage: Arc<LocalStorage>, clock: Arc<dyn Clock>) -> Self {
        let sessions = match storage.get_json::<HashMap<String, Session>>(SESSIONS_KEY) {
            Ok(Some(sessions)) => sessions,
            Ok(None) => HashMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session registry");
                HashMap::new()
            }
        };
        tracing::debug!(count = sessions.len(), "Loaded session registry");
        Self {
            storage,
            clock,
            sessions: Mutex::new(sessions),
        }
    }

    /// Start a new session for `user_id` on the given device.
    pub fn create_session(&self, user_id: DbId, device_info: DeviceInfo) -> Session {
        let now = self.clock.now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id,
            refresh_token: Uuid::new_v4().to_string(),
            created_at: now,
            expires_at: now + session_window(),
            last_activity: now,
            device_info,
        };

        let mut sessions = self.lock();
        sessions.insert(session.token.clone(), session.clone());
        self.persist(&sessions);
        tracing::info!(user_id, device = %session.device_info.device_type, "Session created");
        session
    }

    /// Return the session if it has not expired. An expired session is
    /// removed. Expiry is not extended.
    pub fn validate_session(&self, token: &str) -> Option<Session> {
        let now = self.clock.now();
        let mut sessions = self.lock();
        let session = sessions.get(token)?;
        if session.is_expired_at(now) {
            sessions.remove(token);
            self.persist(&sessions);
            tracing::debug!("Expired session removed on validation");
            return None;
        }
        Some(session.clone())
    }

    /// Slide the session's expiry forward by [`session_window`].
    ///
    /// When `refresh_token` is supplied it must match the stored secret;
    /// a mismatch leaves the session untouched and returns `None`.
    pub fn refresh_session(&self, token: &str, refresh_token: Option<&str>) -> Option<Session> {
        let now = self.clock.now();
        let mut sessions = self.lock();
        let session = sessions.get_mut(token)?;

        if session.is_expired_at(now) {
            sessions.remove(token);
            self.persist(&sessions);
            return None;
        }
        if refresh_token.is_some_and(|r| r != session.refresh_token) {
            tracing::warn!(user_id = session.user_id, "Refresh token mismatch");
            return None;
        }

        session.last_activity = now;
        session.expires_at = now + session_window();
        let refreshed = session.clone();
        self.persist(&sessions);
        Some(refreshed)
    }

    /// True within [`expiry_warning`] of expiry. Unknown tokens are not
    /// expiring.
    pub fn is_session_expiring(&self, token: &str) -> bool {
        let now = self.clock.now();
        self.lock()
            .get(token)
            .is_some_and(|session| session.is_expiring_at(now))
    }

    pub fn invalidate_session(&self, token: &str) {
        let mut sessions = self.lock();
        if sessions.remove(token).is_some() {
            self.persist(&sessions);
        }
    }

    /// Non-expired sessions of `user_id`, most recently active first.
    pub fn get_active_sessions(&self, user_id: DbId) -> Vec<Session> {
        let now = self.clock.now();
        let mut active: Vec<Session> = self
            .lock()
            .values()
            .filter(|s| s.user_id == user_id && !s.is_expired_at(now))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        active
    }

    pub fn update_session_location(&self, token: &str, location: &str) {
        let mut sessions = self.lock();
        if let Some(session) = sessions.get_mut(token) {
            session.device_info.location = location.to_string();
            self.persist(&sessions);
        }
    }

    /// Drop every expired session, returning how many were removed.
    pub fn cleanup_expired_sessions(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        let removed = before - sessions.len();
        if removed > 0 {
            self.persist(&sessions);
            tracing::info!(removed, "Expired sessions cleaned up");
        }
        removed
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, sessions: &HashMap<String, Session>) {
        if let Err(e) = self.storage.set_json(SESSIONS_KEY, sessions) {
            tracing::warn!(error = %e, "Failed to persist session registry");
        }
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
pub(crate) struct ManualClock(Mutex<Timestamp>);

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new(start: Timestamp) -> Arc<Self> {
        Arc::new(Self(Mutex::new(start)))
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.0.lock().unwrap()
    }
}

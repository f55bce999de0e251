//! Sign-in state of the client.
//!
//! [`AuthClient`] ties the API's identity token to a local [`Session`]:
//! login creates both, [`AuthClient::check_session`] keeps them in step and
//! logout tears both down. The identity token's own expiry is authoritative;
//! a session whose token has expired is treated as expired even while the
//! four-day session window is still open.

use std::sync::Arc;
use std::time::Duration;

use emerald_core::types::DbId;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::session::{Clock, DeviceInfo, Session, SessionManager, SystemClock};
use crate::storage::{LocalStorage, REFRESH_TOKEN_KEY, SESSION_TOKEN_KEY, USER_KEY};

/// How often [`AuthClient::spawn_session_watch`] re-checks the session.
pub const SESSION_CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// IP recorded for sessions created by this client.
const UNKNOWN_IP: &str = "Unknown";

/// Signed-in user as kept in local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub token: String,
}

/// Outcome of [`AuthClient::check_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No session on this device.
    SignedOut,
    /// Session was valid and has been refreshed. `expiring` is the
    /// expiry-warning state observed before the refresh.
    Active { expiring: bool },
    /// Session or identity token expired; local sign-in state was cleared.
    Expired,
}

/// A row of the device-management view.
#[derive(Debug, Clone)]
pub struct SessionListing {
    pub session: Session,
    /// The session belongs to this device.
    pub current: bool,
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: DbId,
    exp: i64,
}

pub struct AuthClient {
    api: Arc<ApiClient>,
    storage: Arc<LocalStorage>,
    sessions: Arc<SessionManager>,
    clock: Arc<dyn Clock>,
    user_agent: String,
}

impl AuthClient {
    /// Build the client from `config`, opening its storage and restoring any
    /// signed-in user's token.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let storage = match &config.storage_path {
            Some(path) => LocalStorage::open(path)?,
            None => LocalStorage::in_memory(),
        };
        Ok(Self::new(
            Arc::new(ApiClient::new(config.base_url.clone())),
            Arc::new(storage),
            Arc::new(SystemClock),
            config.user_agent.clone(),
        ))
    }

    pub fn new(
        api: Arc<ApiClient>,
        storage: Arc<LocalStorage>,
        clock: Arc<dyn Clock>,
        user_agent: impl Into<String>,
    ) -> Self {
        let sessions = Arc::new(SessionManager::load(storage.clone(), clock.clone()));
        let client = Self {
            api,
            storage,
            sessions,
            clock,
            user_agent: user_agent.into(),
        };
        if let Some(user) = client.current_user() {
            client.api.set_token(Some(user.token));
        }
        client
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// The stored user, if any. An unreadable entry counts as signed out.
    pub fn current_user(&self) -> Option<StoredUser> {
        match self.storage.get_json::<StoredUser>(USER_KEY) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable stored user");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Sign in and start a session for this device.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<StoredUser> {
        let response = self.api.login(username, password).await?;
        let user_id = token_subject(&response.token).unwrap_or(response.id);

        let user = StoredUser {
            id: user_id,
            username: response.username,
            email: response.email,
            token: response.token,
        };

        let device = DeviceInfo::detect(&self.user_agent, UNKNOWN_IP);
        let session = self.sessions.create_session(user.id, device);

        self.storage.set_item(SESSION_TOKEN_KEY, session.token.as_str())?;
        self.storage.set_item(REFRESH_TOKEN_KEY, session.refresh_token.as_str())?;
        self.storage.set_json(USER_KEY, &user)?;
        self.api.set_token(Some(user.token.clone()));

        tracing::info!(user_id = user.id, "Signed in");
        Ok(user)
    }

    /// Validate and refresh this device's session.
    pub fn check_session(&self) -> ClientResult<SessionStatus> {
        let Some(token) = self.storage.get_item(SESSION_TOKEN_KEY) else {
            if self.current_user().is_some() {
                self.clear_local_state()?;
                return Ok(SessionStatus::Expired);
            }
            return Ok(SessionStatus::SignedOut);
        };
        let refresh_token = self
            .storage
            .get_item(REFRESH_TOKEN_KEY)
            .filter(|t| !t.is_empty());

        if self.sessions.validate_session(&token).is_none() {
            return self.expire();
        }

        let token_expired = self
            .current_user()
            .map_or(true, |user| identity_token_expired(&user.token, self.clock.now().timestamp()));
        if token_expired {
            self.sessions.invalidate_session(&token);
            return self.expire();
        }

        let expiring = self.sessions.is_session_expiring(&token);
        if self
            .sessions
            .refresh_session(&token, refresh_token.as_deref())
            .is_none()
        {
            self.sessions.invalidate_session(&token);
            return self.expire();
        }
        Ok(SessionStatus::Active { expiring })
    }

    /// End this device's session and forget the signed-in user.
    pub fn logout(&self) -> ClientResult<()> {
        if let Some(token) = self.storage.get_item(SESSION_TOKEN_KEY) {
            self.sessions.invalidate_session(&token);
        }
        self.clear_local_state()?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Active sessions of the signed-in user, flagging this device's.
    pub fn list_sessions(&self) -> Vec<SessionListing> {
        let Some(user) = self.current_user() else {
            return Vec::new();
        };
        let current = self.storage.get_item(SESSION_TOKEN_KEY);
        self.sessions
            .get_active_sessions(user.id)
            .into_iter()
            .map(|session| SessionListing {
                current: current.as_deref() == Some(session.token.as_str()),
                session,
            })
            .collect()
    }

    /// End one of the signed-in user's sessions. Ending this device's session
    /// signs out. Returns `false` if `token` is not one of the user's.
    pub fn terminate_session(&self, token: &str) -> ClientResult<bool> {
        let owned = self
            .list_sessions()
            .into_iter()
            .find(|listing| listing.session.token == token);
        match owned {
            None => Ok(false),
            Some(listing) if listing.current => {
                self.logout()?;
                Ok(true)
            }
            Some(_) => {
                self.sessions.invalidate_session(token);
                Ok(true)
            }
        }
    }

    /// Run [`AuthClient::check_session`] every `interval` until `cancel`
    /// fires or the session expires.
    pub fn spawn_session_watch(
        self: Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        match self.check_session() {
                            Ok(SessionStatus::Active { expiring: true }) => {
                                tracing::info!("Session expires soon");
                            }
                            Ok(SessionStatus::Active { expiring: false }) => {}
                            Ok(SessionStatus::Expired) => {
                                tracing::info!("Session expired");
                                break;
                            }
                            Ok(SessionStatus::SignedOut) => break,
                            Err(e) => tracing::warn!(error = %e, "Session check failed"),
                        }
                    }
                }
            }
        })
    }

    fn expire(&self) -> ClientResult<SessionStatus> {
        self.clear_local_state()?;
        Ok(SessionStatus::Expired)
    }

    fn clear_local_state(&self) -> ClientResult<()> {
        self.api.set_token(None);
        self.storage
            .remove_items(&[USER_KEY, SESSION_TOKEN_KEY, REFRESH_TOKEN_KEY])
    }
}

/// Read the claims of an identity token without verifying its signature.
/// Only the server can verify; the client uses the claims for display and
/// expiry.
fn peek_claims(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}

fn token_subject(token: &str) -> Option<DbId> {
    peek_claims(token).map(|claims| claims.sub)
}

/// An undecodable token counts as expired.
fn identity_token_expired(token: &str, now_unix: i64) -> bool {
    peek_claims(token).map_or(true, |claims| claims.exp < now_unix)
}

use std::sync::Arc;

use emerald_core::reset_code::ResetCodeStore;
use emerald_mail::Mailer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or is already a handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: emerald_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Outstanding password-reset codes. Process-local.
    pub reset_codes: Arc<ResetCodeStore>,
    pub mailer: Arc<dyn Mailer>,
}

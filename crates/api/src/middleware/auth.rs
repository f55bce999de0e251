//! Bearer-token authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use emerald_core::error::CoreError;
use emerald_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The acting user, taken from a valid `Authorization: Bearer <token>` header.
///
/// Handlers that take `AuthUser` reject missing, malformed or expired tokens
/// with 401 before the handler body runs.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub email: String,
}

impl AuthUser {
    /// Reject with 403 unless the caller is `user_id`.
    pub fn require_self(&self, user_id: DbId, message: &str) -> Result<(), AppError> {
        if self.user_id != user_id {
            return Err(CoreError::Forbidden(message.to_string()).into());
        }
        Ok(())
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| CoreError::Unauthorized("Access token required".into()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            CoreError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
        })?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| CoreError::Unauthorized("Invalid or expired token".into()))?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

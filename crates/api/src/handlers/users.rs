//! Handlers for the `/users` resource. Every route is self-only.

use axum::extract::{Path, State};
use axum::Json;
use emerald_core::error::CoreError;
use emerald_core::types::DbId;
use emerald_db::models::user::{UpdateUser, UserResponse};
use emerald_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "A valid email address is required"))]
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ValidatePasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: &'static str,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ValidPasswordResponse {
    pub valid: bool,
}

/// PUT /api/users/{id}
///
/// Only supplied, non-blank fields change.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    auth.require_self(user_id, "Unauthorized to update other user's profile")?;

    let input = UpdateProfileRequest {
        username: trimmed(input.username),
        email: trimmed(input.email),
    };
    input
        .validate()
        .map_err(|e| AppError::validation("Invalid profile details", e))?;

    let update = UpdateUser {
        username: input.username,
        email: input.email,
    };

    if update.is_empty() {
        let user = UserRepo::find_by_id(&state.pool, user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id))?;
        return Ok(Json(ProfileResponse {
            message: "No changes to update",
            user: UserResponse::from(&user),
        }));
    }

    if UserRepo::is_taken(
        &state.pool,
        update.username.as_deref(),
        update.email.as_deref(),
        Some(user_id),
    )
    .await?
    {
        return Err(CoreError::Conflict("Username or email already exists".into()).into());
    }

    let user = UserRepo::update(&state.pool, user_id, &update)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user_id))?;

    tracing::info!(user_id, "Profile updated");
    Ok(Json(ProfileResponse {
        message: "Profile updated successfully",
        user: UserResponse::from(&user),
    }))
}

/// PUT /api/users/{id}/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    auth.require_self(user_id, "Unauthorized to update other user's password")?;
    input
        .validate()
        .map_err(|e| AppError::validation("Invalid password change", e))?;

    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user_id))?;

    let current_ok = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_ok {
        return Err(CoreError::Validation("Current password is incorrect".into()).into());
    }

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user_id, &password_hash).await?;

    tracing::info!(user_id, "Password changed");
    Ok(Json(MessageResponse {
        message: "Password updated successfully",
    }))
}

/// POST /api/users/{id}/validate-password
pub async fn validate_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
    Json(input): Json<ValidatePasswordRequest>,
) -> AppResult<Json<ValidPasswordResponse>> {
    auth.require_self(user_id, "Unauthorized to validate other user's password")?;

    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user_id))?;

    let valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    Ok(Json(ValidPasswordResponse { valid }))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

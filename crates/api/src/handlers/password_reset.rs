//! Handlers for the emailed-code password reset flow.
//!
//! Codes are held in the injected [`ResetCodeStore`](emerald_core::reset_code::ResetCodeStore),
//! keyed by normalised email.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use emerald_core::error::CoreError;
use emerald_db::repositories::UserRepo;
use emerald_mail::template;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

const UNREGISTERED_EMAIL: &str = "The provided email address is not registered in our system. \
                                  Please check the email address or register a new account.";

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ResetRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct VerifyCodeRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Verification code is required"))]
    pub code: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Verification code is required"))]
    pub code: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub valid: bool,
    pub message: &'static str,
}

/// POST /api/password-reset/request
///
/// Issue a fresh code for a registered email and mail it. Any previous code
/// for the same email is replaced.
pub async fn request_reset(
    State(state): State<AppState>,
    Json(input): Json<ResetRequest>,
) -> AppResult<Json<MessageResponse>> {
    input
        .validate()
        .map_err(|e| AppError::validation("Email is required", e))?;

    if !UserRepo::email_exists(&state.pool, &input.email).await? {
        return Err(AppError::NotFound(UNREGISTERED_EMAIL.into()));
    }

    let code = state.reset_codes.issue(&input.email, Utc::now()).await;
    let message = template::password_reset(&code, state.reset_codes.ttl().num_minutes());

    if let Err(e) = state.mailer.send(input.email.trim(), &message).await {
        state.reset_codes.remove(&input.email).await;
        return Err(AppError::InternalError(format!(
            "Failed to send reset code: {e}"
        )));
    }

    tracing::info!("Password reset code issued");
    Ok(Json(MessageResponse {
        message: "Password reset code sent successfully",
    }))
}

/// POST /api/password-reset/verify-code
///
/// Reports validity without consuming the code. Wrong guesses count toward
/// the store's attempt limit.
pub async fn verify_code(
    State(state): State<AppState>,
    Json(input): Json<VerifyCodeRequest>,
) -> AppResult<Json<VerifyCodeResponse>> {
    input
        .validate()
        .map_err(|e| AppError::validation("Email and verification code are required", e))?;

    let valid = state
        .reset_codes
        .verify(&input.email, &input.code, Utc::now())
        .await;

    Ok(Json(VerifyCodeResponse {
        valid,
        message: if valid {
            "Code verified successfully"
        } else {
            "Invalid or expired code"
        },
    }))
}

/// POST /api/password-reset/reset
///
/// Verify the code, then replace the password hash in a single transaction.
/// The code is consumed only after the transaction commits.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    input.validate().map_err(|e| {
        AppError::validation("Email, verification code, and new password are required", e)
    })?;

    if !state
        .reset_codes
        .verify(&input.email, &input.code, Utc::now())
        .await
    {
        return Err(CoreError::Validation("Invalid or expired reset code".into()).into());
    }

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let mut tx = state.pool.begin().await?;
    let user = UserRepo::find_by_email_for_update(&mut *tx, &input.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    UserRepo::update_password(&mut *tx, user.id, &password_hash).await?;
    tx.commit().await?;

    state.reset_codes.remove(&input.email).await;
    tracing::info!(user_id = user.id, "Password reset completed");

    Ok(Json(MessageResponse {
        message: "Password reset successfully",
    }))
}

//! Handlers for the `/auth` resource (register, login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use emerald_core::error::CoreError;
use emerald_core::types::DbId;
use emerald_db::models::user::CreateUser;
use emerald_db::repositories::{PermissionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Returned by both register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub id: DbId,
    pub username: String,
    pub email: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/register
///
/// Create an account with baseline forum permissions and sign it in.
pub async fn register(
    State(state): State<AppState>,
    Json(mut input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    input.username = input.username.trim().to_string();
    input.email = input.email.trim().to_string();
    input
        .validate()
        .map_err(|e| AppError::validation("Invalid registration details", e))?;

    if UserRepo::is_taken(&state.pool, Some(&input.username), Some(&input.email), None).await? {
        return Err(CoreError::Conflict("Username or email already exists".into()).into());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let mut tx = state.pool.begin().await?;
    let user = UserRepo::create(
        &mut *tx,
        &CreateUser {
            username: input.username,
            email: input.email,
            password_hash,
        },
    )
    .await?;
    PermissionRepo::ensure_default(&mut *tx, user.id).await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    let response = auth_response(&state, user.id, user.username, user.email)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login
///
/// Unknown usernames and wrong passwords are indistinguishable (401).
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    input
        .validate()
        .map_err(|e| AppError::validation("Username and password are required", e))?;

    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("Invalid credentials".into()))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = user.id, "Login rejected: wrong password");
        return Err(CoreError::Unauthorized("Invalid credentials".into()).into());
    }

    UserRepo::record_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(auth_response(&state, user.id, user.username, user.email)?))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn auth_response(
    state: &AppState,
    id: DbId,
    username: String,
    email: String,
) -> AppResult<AuthResponse> {
    let token = generate_token(id, &email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(AuthResponse {
        token,
        id,
        username,
        email,
    })
}

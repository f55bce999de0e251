//! Whitelist application submission.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use emerald_core::types::DbId;
use emerald_db::models::whitelist::CreateWhitelistApplication;
use emerald_db::repositories::WhitelistRepo;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct WhitelistRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Discord ID is required"))]
    pub discord_id: String,
    #[validate(length(min = 1, message = "Steam ID is required"))]
    pub steam_id: String,
    #[validate(length(min = 1, message = "Age is required"))]
    #[serde(deserialize_with = "string_or_number")]
    pub age: String,
    #[validate(length(min = 1, message = "Roleplay experience is required"))]
    pub rp_experience: String,
    #[validate(length(min = 1, message = "Motivation is required"))]
    pub motivation: String,
}

#[derive(Debug, Serialize)]
pub struct WhitelistResponse {
    pub message: &'static str,
    pub id: DbId,
}

/// Forms submit age either as text or as a JSON number.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

/// POST /api/whitelist/apply
pub async fn apply(
    State(state): State<AppState>,
    Json(input): Json<WhitelistRequest>,
) -> AppResult<(StatusCode, Json<WhitelistResponse>)> {
    let input = WhitelistRequest {
        name: input.name.trim().to_string(),
        discord_id: input.discord_id.trim().to_string(),
        steam_id: input.steam_id.trim().to_string(),
        age: input.age.trim().to_string(),
        rp_experience: input.rp_experience.trim().to_string(),
        motivation: input.motivation.trim().to_string(),
    };
    input
        .validate()
        .map_err(|e| AppError::validation("All fields are required", e))?;

    let application = WhitelistRepo::create(
        &state.pool,
        &CreateWhitelistApplication {
            name: input.name,
            discord_id: input.discord_id,
            steam_id: input.steam_id,
            age: input.age,
            rp_experience: input.rp_experience,
            motivation: input.motivation,
        },
    )
    .await?;

    tracing::info!(application_id = application.id, "Whitelist application submitted");
    Ok((
        StatusCode::CREATED,
        Json(WhitelistResponse {
            message: "Application submitted successfully",
            id: application.id,
        }),
    ))
}

//! Whitelist application model and DTO.

use emerald_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A stored whitelist application awaiting manual review.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WhitelistApplication {
    pub id: DbId,
    pub name: String,
    pub discord_id: String,
    pub steam_id: String,
    pub age: String,
    pub rp_experience: String,
    pub motivation: String,
    pub created_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateWhitelistApplication {
    pub name: String,
    pub discord_id: String,
    pub steam_id: String,
    pub age: String,
    pub rp_experience: String,
    pub motivation: String,
}

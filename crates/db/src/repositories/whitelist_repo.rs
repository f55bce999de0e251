//! Repository for the `whitelist_applications` table.

use sqlx::PgPool;

use crate::models::whitelist::{CreateWhitelistApplication, WhitelistApplication};

const COLUMNS: &str = "id, name, discord_id, steam_id, age, rp_experience, motivation, created_at";

pub struct WhitelistRepo;

impl WhitelistRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateWhitelistApplication,
    ) -> Result<WhitelistApplication, sqlx::Error> {
        let query = format!(
            "INSERT INTO whitelist_applications
                (name, discord_id, steam_id, age, rp_experience, motivation)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WhitelistApplication>(&query)
            .bind(&input.name)
            .bind(&input.discord_id)
            .bind(&input.steam_id)
            .bind(&input.age)
            .bind(&input.rp_experience)
            .bind(&input.motivation)
            .fetch_one(pool)
            .await
    }
}

//! Repository for the `user_permissions` table (Permission Resolver storage).

use emerald_core::permissions::ForumPermissions;
use emerald_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::permission::ForumPermissionRow;

const COLUMNS: &str = "user_id, can_create_thread, can_create_post, can_edit_own, \
                        can_delete_own, can_pin_thread, can_lock_thread, can_moderate, \
                        created_at, updated_at";

pub struct PermissionRepo;

impl PermissionRepo {
    /// Read the explicit permission row for a user, without side effects.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<ForumPermissionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_permissions WHERE user_id = $1");
        sqlx::query_as::<_, ForumPermissionRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert the baseline row for a user if none exists.
    ///
    /// Idempotent. Returns `true` when a row was created.
    pub async fn ensure_default<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let defaults = ForumPermissions::default();
        let result = sqlx::query(
            "INSERT INTO user_permissions
                (user_id, can_create_thread, can_create_post, can_edit_own,
                 can_delete_own, can_pin_thread, can_lock_thread, can_moderate)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(defaults.can_create_thread)
        .bind(defaults.can_create_post)
        .bind(defaults.can_edit_own)
        .bind(defaults.can_delete_own)
        .bind(defaults.can_pin_thread)
        .bind(defaults.can_lock_thread)
        .bind(defaults.can_moderate)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Effective capabilities for a user.
    ///
    /// Ensures the baseline row exists first, so a row is guaranteed to be
    /// present afterwards.
    pub async fn resolve(pool: &PgPool, user_id: DbId) -> Result<ForumPermissions, sqlx::Error> {
        if Self::ensure_default(pool, user_id).await? {
            tracing::debug!(user_id, "Created baseline forum permissions");
        }
        let query = format!("SELECT {COLUMNS} FROM user_permissions WHERE user_id = $1");
        let row = sqlx::query_as::<_, ForumPermissionRow>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    /// Replace a user's capability set (administrative action).
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        permissions: &ForumPermissions,
    ) -> Result<ForumPermissionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_permissions
                (user_id, can_create_thread, can_create_post, can_edit_own,
                 can_delete_own, can_pin_thread, can_lock_thread, can_moderate)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (user_id) DO UPDATE SET
                can_create_thread = EXCLUDED.can_create_thread,
                can_create_post = EXCLUDED.can_create_post,
                can_edit_own = EXCLUDED.can_edit_own,
                can_delete_own = EXCLUDED.can_delete_own,
                can_pin_thread = EXCLUDED.can_pin_thread,
                can_lock_thread = EXCLUDED.can_lock_thread,
                can_moderate = EXCLUDED.can_moderate
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ForumPermissionRow>(&query)
            .bind(user_id)
            .bind(permissions.can_create_thread)
            .bind(permissions.can_create_post)
            .bind(permissions.can_edit_own)
            .bind(permissions.can_delete_own)
            .bind(permissions.can_pin_thread)
            .bind(permissions.can_lock_thread)
            .bind(permissions.can_moderate)
            .fetch_one(pool)
            .await
    }
}

//! Repository for the `forum_threads` table.

use emerald_core::types::DbId;
use sqlx::PgPool;

use crate::models::forum::{CreateThread, ForumThread, ThreadWithAuthor, UpdateThread};

const COLUMNS: &str = "id, category_id, user_id, title, content, is_pinned, is_locked, views, \
                        created_at, updated_at";

/// Same columns qualified for joins against `users u`.
const JOINED_COLUMNS: &str = "t.id, t.category_id, t.user_id, u.username, t.title, t.content, \
                               t.is_pinned, t.is_locked, t.views, t.created_at, t.updated_at";

pub struct ThreadRepo;

impl ThreadRepo {
    pub async fn create(pool: &PgPool, input: &CreateThread) -> Result<ForumThread, sqlx::Error> {
        let query = format!(
            "INSERT INTO forum_threads (category_id, user_id, title, content)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ForumThread>(&query)
            .bind(input.category_id)
            .bind(input.user_id)
            .bind(&input.title)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ForumThread>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forum_threads WHERE id = $1");
        sqlx::query_as::<_, ForumThread>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_with_author(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ThreadWithAuthor>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM forum_threads t
             JOIN users u ON u.id = t.user_id
             WHERE t.id = $1"
        );
        sqlx::query_as::<_, ThreadWithAuthor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Threads in a category: pinned first, then newest first.
    pub async fn list_by_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<ThreadWithAuthor>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM forum_threads t
             JOIN users u ON u.id = t.user_id
             WHERE t.category_id = $1
             ORDER BY t.is_pinned DESC, t.created_at DESC, t.id DESC"
        );
        sqlx::query_as::<_, ThreadWithAuthor>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Returns `None` if the thread does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateThread,
    ) -> Result<Option<ForumThread>, sqlx::Error> {
        let query = format!(
            "UPDATE forum_threads SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                is_pinned = COALESCE($4, is_pinned),
                is_locked = COALESCE($5, is_locked)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ForumThread>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.is_pinned)
            .bind(input.is_locked)
            .fetch_optional(pool)
            .await
    }
}

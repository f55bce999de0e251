//! Repository for the `forum_posts` table.

use emerald_core::types::DbId;
use sqlx::PgPool;

use crate::models::forum::{CreatePost, ForumPost, PostWithAuthor, UpdatePost};

const COLUMNS: &str = "id, thread_id, user_id, content, is_edited, created_at, updated_at";

pub struct PostRepo;

impl PostRepo {
    pub async fn create(pool: &PgPool, input: &CreatePost) -> Result<ForumPost, sqlx::Error> {
        let query = format!(
            "INSERT INTO forum_posts (thread_id, user_id, content)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ForumPost>(&query)
            .bind(input.thread_id)
            .bind(input.user_id)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ForumPost>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forum_posts WHERE id = $1");
        sqlx::query_as::<_, ForumPost>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Posts in a thread, oldest first.
    pub async fn list_by_thread(
        pool: &PgPool,
        thread_id: DbId,
    ) -> Result<Vec<PostWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, PostWithAuthor>(
            "SELECT p.id, p.thread_id, p.user_id, u.username, p.content, p.is_edited,
                    p.created_at, p.updated_at
             FROM forum_posts p
             JOIN users u ON u.id = p.user_id
             WHERE p.thread_id = $1
             ORDER BY p.created_at ASC, p.id ASC",
        )
        .bind(thread_id)
        .fetch_all(pool)
        .await
    }

    /// Apply a partial update; changing content marks the post as edited.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePost,
    ) -> Result<Option<ForumPost>, sqlx::Error> {
        let query = format!(
            "UPDATE forum_posts SET
                content = COALESCE($2, content),
                is_edited = is_edited OR $2 IS NOT NULL
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ForumPost>(&query)
            .bind(id)
            .bind(&input.content)
            .fetch_optional(pool)
            .await
    }
}

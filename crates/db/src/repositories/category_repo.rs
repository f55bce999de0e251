//! Repository for the `forum_categories` table.

use emerald_core::types::DbId;
use sqlx::PgPool;

use crate::models::forum::{CategoryWithCounts, CreateCategory, ForumCategory};

const COLUMNS: &str = "id, name, description, order_position, created_at, updated_at";

pub struct CategoryRepo;

impl CategoryRepo {
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<ForumCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO forum_categories (name, description, order_position)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ForumCategory>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.order_position)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ForumCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forum_categories WHERE id = $1");
        sqlx::query_as::<_, ForumCategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All categories in display order, each with its thread and post totals.
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<CategoryWithCounts>, sqlx::Error> {
        sqlx::query_as::<_, CategoryWithCounts>(
            "SELECT c.id, c.name, c.description, c.order_position,
                    COUNT(DISTINCT t.id) AS thread_count,
                    COUNT(p.id) AS post_count,
                    c.created_at, c.updated_at
             FROM forum_categories c
             LEFT JOIN forum_threads t ON t.category_id = c.id
             LEFT JOIN forum_posts p ON p.thread_id = t.id
             GROUP BY c.id
             ORDER BY c.order_position ASC, c.id ASC",
        )
        .fetch_all(pool)
        .await
    }
}

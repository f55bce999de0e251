//! Forum category, thread and post models.
//!
//! Hierarchy is `category -> thread -> post`; threads and posts are owned by
//! the user who created them.

use emerald_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ForumCategory {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub order_position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Category listing row with aggregate counts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryWithCounts {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub order_position: i32,
    pub thread_count: i64,
    pub post_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateCategory {
    pub name: String,
    pub description: String,
    pub order_position: i32,
}

// ---------------------------------------------------------------------------
// Threads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ForumThread {
    pub id: DbId,
    pub category_id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub views: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Thread row joined with its author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ThreadWithAuthor {
    pub id: DbId,
    pub category_id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub views: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateThread {
    pub category_id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub content: String,
}

/// Partial thread update. Only `Some` fields change.
#[derive(Debug, Default)]
pub struct UpdateThread {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_pinned: Option<bool>,
    pub is_locked: Option<bool>,
}

impl UpdateThread {
    pub fn touches_content(&self) -> bool {
        self.title.is_some() || self.content.is_some()
    }

    pub fn touches_flags(&self) -> bool {
        self.is_pinned.is_some() || self.is_locked.is_some()
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ForumPost {
    pub id: DbId,
    pub thread_id: DbId,
    pub user_id: DbId,
    pub content: String,
    pub is_edited: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Post row joined with its author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostWithAuthor {
    pub id: DbId,
    pub thread_id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub content: String,
    pub is_edited: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug)]
pub struct CreatePost {
    pub thread_id: DbId,
    pub user_id: DbId,
    pub content: String,
}

/// Partial post update. Editing content marks the post as edited.
#[derive(Debug, Default)]
pub struct UpdatePost {
    pub content: Option<String>,
}

//! Handlers for the `/forum` resource.
//!
//! Every mutation resolves the acting user's permissions from the identity
//! token and runs the matching guard from `emerald_core::permissions` before
//! touching the database. A `userId` in a request body is accepted but ignored.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use emerald_core::error::CoreError;
use emerald_core::permissions::{
    authorize_post_create, authorize_post_update, authorize_thread_create,
    authorize_thread_update, ForumPermissions, ThreadChange,
};
use emerald_core::types::DbId;
use emerald_db::models::forum::{
    CategoryWithCounts, CreateCategory, CreatePost, CreateThread, ForumCategory, ForumPost,
    ForumThread, PostWithAuthor, ThreadWithAuthor, UpdatePost, UpdateThread,
};
use emerald_db::repositories::{CategoryRepo, PermissionRepo, PostRepo, ThreadRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: String,
    #[serde(alias = "order_position")]
    pub order: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateThreadRequest {
    #[validate(range(min = 1, message = "Category is required"))]
    pub category_id: DbId,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    /// Ignored; the author is the authenticated user.
    pub user_id: Option<DbId>,
}

/// Thread PATCH body. Empty strings are treated as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateThreadRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(alias = "isPinned")]
    pub is_pinned: Option<bool>,
    #[serde(alias = "isLocked")]
    pub is_locked: Option<bool>,
    #[serde(alias = "userId")]
    pub user_id: Option<DbId>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(range(min = 1, message = "Thread is required"))]
    pub thread_id: DbId,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub user_id: Option<DbId>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub user_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ThreadDetail {
    pub thread: ThreadWithAuthor,
    pub posts: Vec<PostWithAuthor>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// GET /api/forum/categories
///
/// Degrades to an empty list when the store is unavailable.
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<CategoryWithCounts>> {
    match CategoryRepo::list_with_counts(&state.pool).await {
        Ok(categories) => Json(categories),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list forum categories");
            Json(Vec::new())
        }
    }
}

/// POST /api/forum/categories
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ForumCategory>)> {
    input
        .validate()
        .map_err(|e| AppError::validation("Category name is required", e))?;

    let category = CategoryRepo::create(
        &state.pool,
        &CreateCategory {
            name: input.name,
            description: input.description,
            order_position: input.order,
        },
    )
    .await?;

    tracing::info!(category_id = category.id, user_id = auth.user_id, "Forum category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/forum/categories/{id}/threads
pub async fn list_threads(
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
) -> AppResult<Json<Vec<ThreadWithAuthor>>> {
    let threads = ThreadRepo::list_by_category(&state.pool, category_id).await?;
    Ok(Json(threads))
}

// ---------------------------------------------------------------------------
// Threads
// ---------------------------------------------------------------------------

/// GET /api/forum/threads/{id}
pub async fn get_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<DbId>,
) -> AppResult<Json<ThreadDetail>> {
    let thread = ThreadRepo::find_with_author(&state.pool, thread_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Thread", thread_id))?;
    let posts = PostRepo::list_by_thread(&state.pool, thread_id).await?;
    Ok(Json(ThreadDetail { thread, posts }))
}

/// GET /api/forum/threads/{id}/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Path(thread_id): Path<DbId>,
) -> AppResult<Json<Vec<PostWithAuthor>>> {
    ThreadRepo::find_by_id(&state.pool, thread_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Thread", thread_id))?;
    let posts = PostRepo::list_by_thread(&state.pool, thread_id).await?;
    Ok(Json(posts))
}

/// POST /api/forum/threads
pub async fn create_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateThreadRequest>,
) -> AppResult<(StatusCode, Json<ForumThread>)> {
    input
        .validate()
        .map_err(|e| AppError::validation("Title and content are required", e))?;

    let permissions = PermissionRepo::resolve(&state.pool, auth.user_id).await?;
    authorize_thread_create(&permissions)?;

    CategoryRepo::find_by_id(&state.pool, input.category_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Category", input.category_id))?;

    let thread = ThreadRepo::create(
        &state.pool,
        &CreateThread {
            category_id: input.category_id,
            user_id: auth.user_id,
            title: input.title,
            content: input.content,
        },
    )
    .await?;

    tracing::info!(thread_id = thread.id, user_id = auth.user_id, "Thread created");
    Ok((StatusCode::CREATED, Json(thread)))
}

/// PATCH /api/forum/threads/{id}
///
/// Owners may change title and content; pin/lock and edits to other users'
/// threads need `can_moderate`.
pub async fn update_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(thread_id): Path<DbId>,
    Json(input): Json<UpdateThreadRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let thread = ThreadRepo::find_by_id(&state.pool, thread_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Thread", thread_id))?;

    let update = UpdateThread {
        title: non_empty(input.title),
        content: non_empty(input.content),
        is_pinned: input.is_pinned,
        is_locked: input.is_locked,
    };

    let permissions = PermissionRepo::resolve(&state.pool, auth.user_id).await?;
    let change = ThreadChange {
        content: update.touches_content(),
        flags: update.touches_flags(),
    };
    if let Err(e) = authorize_thread_update(auth.user_id, thread.user_id, &permissions, change) {
        tracing::warn!(thread_id, user_id = auth.user_id, "Thread update rejected");
        return Err(e.into());
    }

    if change.content || change.flags {
        ThreadRepo::update(&state.pool, thread_id, &update).await?;
        tracing::info!(thread_id, user_id = auth.user_id, "Thread updated");
    }

    Ok(Json(SuccessResponse { success: true }))
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// POST /api/forum/posts
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<ForumPost>)> {
    input
        .validate()
        .map_err(|e| AppError::validation("Content is required", e))?;

    let thread = ThreadRepo::find_by_id(&state.pool, input.thread_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Thread", input.thread_id))?;

    let permissions = PermissionRepo::resolve(&state.pool, auth.user_id).await?;
    authorize_post_create(&permissions, thread.is_locked)?;

    let post = PostRepo::create(
        &state.pool,
        &CreatePost {
            thread_id: thread.id,
            user_id: auth.user_id,
            content: input.content,
        },
    )
    .await?;

    tracing::info!(post_id = post.id, thread_id = thread.id, user_id = auth.user_id, "Post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// PATCH /api/forum/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<DbId>,
    Json(input): Json<UpdatePostRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let post = PostRepo::find_by_id(&state.pool, post_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Post", post_id))?;

    let permissions = PermissionRepo::resolve(&state.pool, auth.user_id).await?;
    authorize_post_update(auth.user_id, post.user_id, &permissions)?;

    input
        .validate()
        .map_err(|e| AppError::validation("Content is required", e))?;

    PostRepo::update(
        &state.pool,
        post_id,
        &UpdatePost {
            content: Some(input.content),
        },
    )
    .await?;

    tracing::info!(post_id, user_id = auth.user_id, "Post updated");
    Ok(Json(SuccessResponse { success: true }))
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

/// GET /api/forum/users/{id}/permissions
///
/// Read-only: reports the baseline set when no row exists, without creating one.
pub async fn get_permissions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<ForumPermissions>> {
    let permissions = PermissionRepo::find_for_user(&state.pool, user_id)
        .await?
        .map(ForumPermissions::from)
        .unwrap_or_default();
    Ok(Json(permissions))
}

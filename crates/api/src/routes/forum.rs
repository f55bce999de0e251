//! Route definitions for the `/forum` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::forum;
use crate::state::AppState;

/// Routes mounted at `/forum`.
///
/// ```text
/// GET, POST  /categories
/// GET        /categories/{id}/threads
/// POST       /threads
/// GET, PATCH /threads/{id}
/// GET        /threads/{id}/posts
/// POST       /posts
/// PATCH      /posts/{id}
/// GET        /users/{id}/permissions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(forum::list_categories).post(forum::create_category),
        )
        .route("/categories/{id}/threads", get(forum::list_threads))
        .route("/threads", post(forum::create_thread))
        .route(
            "/threads/{id}",
            get(forum::get_thread).patch(forum::update_thread),
        )
        .route("/threads/{id}/posts", get(forum::list_posts))
        .route("/posts", post(forum::create_post))
        .route("/posts/{id}", patch(forum::update_post))
        .route("/users/{id}/permissions", get(forum::get_permissions))
}

pub mod auth;
pub mod forum;
pub mod health;
pub mod password_reset;
pub mod users;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth/register                          register (public)
/// /auth/login                             login (public)
///
/// /password-reset/request                 email a reset code (public)
/// /password-reset/verify-code             check a code (public)
/// /password-reset/reset                   set a new password (public)
///
/// /forum/categories                       list (public), create (auth)
/// /forum/categories/{id}/threads          list threads (public)
/// /forum/threads                          create (auth)
/// /forum/threads/{id}                     get with posts (public), update (auth)
/// /forum/threads/{id}/posts               list posts (public)
/// /forum/posts                            create (auth)
/// /forum/posts/{id}                       update (auth)
/// /forum/users/{id}/permissions           get (auth)
///
/// /users/{id}                             update profile (self)
/// /users/{id}/password                    change password (self)
/// /users/{id}/validate-password           check current password (self)
///
/// /whitelist/apply                        submit application (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/password-reset", password_reset::router())
        .nest("/forum", forum::router())
        .nest("/users", users::router())
        .route("/whitelist/apply", post(handlers::whitelist::apply))
}

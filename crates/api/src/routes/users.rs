use axum::routing::{post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`. All require the caller to be the target user.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(users::update_profile))
        .route("/{id}/password", put(users::change_password))
        .route("/{id}/validate-password", post(users::validate_password))
}

use axum::routing::post;
use axum::Router;

use crate::handlers::password_reset;
use crate::state::AppState;

/// Routes mounted at `/password-reset`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", post(password_reset::request_reset))
        .route("/verify-code", post(password_reset::verify_code))
        .route("/reset", post(password_reset::reset_password))
}

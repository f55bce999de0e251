//! HTTP-level integration tests for registration and login.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, register, TEST_JWT_SECRET, TEST_PASSWORD};
use emerald_api::auth::jwt::{validate_token, JwtConfig};
use emerald_db::repositories::{PermissionRepo, UserRepo};
use sqlx::PgPool;

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        expiry_hours: 24,
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_returns_token_and_profile(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let body = serde_json::json!({
        "username": "newplayer",
        "email": "newplayer@example.com",
        "password": TEST_PASSWORD,
    });
    let response = post_json(app, "/api/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["username"], "newplayer");
    assert_eq!(json["email"], "newplayer@example.com");

    let id = json["id"].as_i64().unwrap();
    let claims = validate_token(json["token"].as_str().unwrap(), &jwt_config()).unwrap();
    assert_eq!(claims.sub, id);

    let stored = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert!(stored.password_hash.starts_with("$argon2id$"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_creates_default_permissions(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let user = register(&app, "permplayer").await;

    let row = PermissionRepo::find_for_user(&pool, user.id).await.unwrap();
    let row = row.expect("registration should create a permission row");
    assert!(row.can_create_thread && row.can_create_post && row.can_edit_own);
    assert!(!row.can_moderate);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_duplicate_username_is_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(&app, "taken").await;

    let body = serde_json::json!({
        "username": "taken",
        "email": "someone-else@example.com",
        "password": TEST_PASSWORD,
    });
    let response = post_json(app, "/api/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "Username or email already exists");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_duplicate_email_is_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(&app, "first").await;

    let body = serde_json::json!({
        "username": "second",
        "email": "FIRST@example.com",
        "password": TEST_PASSWORD,
    });
    let response = post_json(app, "/api/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_username_match_is_case_sensitive(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(&app, "casey").await;

    let body = serde_json::json!({
        "username": "Casey",
        "email": "casey2@example.com",
        "password": TEST_PASSWORD,
    });
    let response = post_json(app, "/api/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_validation_reports_fields(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "ab", "email": "not-an-email" });
    let response = post_json(app, "/api/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["errors"]["username"].is_string());
    assert!(json["errors"]["email"].is_string());
    assert!(json["errors"]["password"].is_string());
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success_token_authorizes_protected_call(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let user = register(&app, "loginuser").await;

    let body = serde_json::json!({ "username": "loginuser", "password": TEST_PASSWORD });
    let response = post_json(app.clone(), "/api/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["id"], user.id);
    assert_eq!(json["email"], "loginuser@example.com");
    let token = json["token"].as_str().unwrap();
    assert_eq!(validate_token(token, &jwt_config()).unwrap().sub, user.id);

    let uri = format!("/api/forum/users/{}/permissions", user.id);
    let response = get_auth(app, &uri, token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(stored.last_login.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(&app, "wrongpw").await;

    let body = serde_json::json!({ "username": "wrongpw", "password": "incorrect_password" });
    let response = post_json(app, "/api/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid credentials");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_unknown_user_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "ghost", "password": "whatever123" });
    let response = post_json(app, "/api/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_missing_fields_is_400(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/auth/login", serde_json::json!({ "username": "x" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Username and password are required");
    assert_eq!(json["errors"]["password"], "Password is required");
    assert!(json["errors"].get("username").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_protected_route_without_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::get(app.clone(), "/api/forum/users/1/permissions").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/forum/users/1/permissions", "garbage").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

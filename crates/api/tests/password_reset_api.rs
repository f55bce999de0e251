//! HTTP-level integration tests for the emailed-code password reset flow.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, post_json, register, spawn_app};
use emerald_core::reset_code::MAX_RESET_CODE_ATTEMPTS;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unregistered_email_is_404_with_message(pool: PgPool) {
    let test_app = spawn_app(pool);

    let response = post_json(
        test_app.router,
        "/api/password-reset/request",
        serde_json::json!({ "email": "nobody@example.com" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("not registered"));
    assert!(test_app.mailer.sent().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_request_emails_six_digit_code(pool: PgPool) {
    let test_app = spawn_app(pool);
    register(&test_app.router, "resetme").await;

    let response = post_json(
        test_app.router.clone(),
        "/api/password-reset/request",
        serde_json::json!({ "email": "  ResetMe@Example.com " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let sent = test_app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "ResetMe@Example.com");
    assert!(sent[0].1.body.contains("15 minutes"));

    let code = test_app.mailer.last_code().expect("email should carry a code");
    assert_eq!(code.len(), 6);
    assert!(
        test_app
            .reset_codes
            .verify("resetme@example.com", &code, Utc::now())
            .await
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_verify_code_only_accepts_exact_code(pool: PgPool) {
    let test_app = spawn_app(pool);
    register(&test_app.router, "verifier").await;
    test_app
        .reset_codes
        .insert("verifier@example.com", "123456", Utc::now())
        .await;

    let check = |code: &'static str| {
        post_json(
            test_app.router.clone(),
            "/api/password-reset/verify-code",
            serde_json::json!({ "email": "verifier@example.com", "code": code }),
        )
    };

    let json = body_json(check("123456").await).await;
    assert_eq!(json["valid"], true);

    let json = body_json(check("654321").await).await;
    assert_eq!(json["valid"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_code_is_invalid(pool: PgPool) {
    let test_app = spawn_app(pool);
    register(&test_app.router, "slowpoke").await;
    test_app
        .reset_codes
        .insert(
            "slowpoke@example.com",
            "123456",
            Utc::now() - Duration::minutes(16),
        )
        .await;

    let response = post_json(
        test_app.router.clone(),
        "/api/password-reset/verify-code",
        serde_json::json!({ "email": "slowpoke@example.com", "code": "123456" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["valid"], false);
    assert!(test_app.reset_codes.is_empty().await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_verify_code_missing_fields_is_400(pool: PgPool) {
    let test_app = spawn_app(pool);

    let response = post_json(
        test_app.router,
        "/api/password-reset/verify-code",
        serde_json::json!({ "email": "a@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_reset_changes_password_and_consumes_code(pool: PgPool) {
    let test_app = spawn_app(pool);
    register(&test_app.router, "forgetful").await;

    let response = post_json(
        test_app.router.clone(),
        "/api/password-reset/request",
        serde_json::json!({ "email": "forgetful@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let code = test_app.mailer.last_code().unwrap();

    let reset_body = serde_json::json!({
        "email": "forgetful@example.com",
        "code": code,
        "newPassword": "brand-new-secret",
    });
    let response = post_json(
        test_app.router.clone(),
        "/api/password-reset/reset",
        reset_body.clone(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The code cannot be replayed.
    let response = post_json(test_app.router.clone(), "/api/password-reset/reset", reset_body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let login = |password: &'static str| {
        post_json(
            test_app.router.clone(),
            "/api/auth/login",
            serde_json::json!({ "username": "forgetful", "password": password }),
        )
    };
    assert_eq!(login("brand-new-secret").await.status(), StatusCode::OK);
    assert_eq!(login(common::TEST_PASSWORD).await.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reset_with_wrong_code_is_400(pool: PgPool) {
    let test_app = spawn_app(pool);
    register(&test_app.router, "guesser").await;
    test_app
        .reset_codes
        .insert("guesser@example.com", "111111", Utc::now())
        .await;

    let response = post_json(
        test_app.router,
        "/api/password-reset/reset",
        serde_json::json!({
            "email": "guesser@example.com",
            "code": "999999",
            "newPassword": "irrelevant-password",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid or expired reset code");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_code_is_discarded_after_too_many_wrong_guesses(pool: PgPool) {
    let test_app = spawn_app(pool);
    register(&test_app.router, "bruteforce").await;
    test_app
        .reset_codes
        .insert("bruteforce@example.com", "424242", Utc::now())
        .await;

    let check = |code: &'static str| {
        post_json(
            test_app.router.clone(),
            "/api/password-reset/verify-code",
            serde_json::json!({ "email": "bruteforce@example.com", "code": code }),
        )
    };

    for _ in 0..MAX_RESET_CODE_ATTEMPTS {
        assert_eq!(body_json(check("000000").await).await["valid"], false);
    }

    // The real code no longer works once the limit is reached.
    let json = body_json(check("424242").await).await;
    assert_eq!(json["valid"], false);
    assert!(test_app.reset_codes.is_empty().await);
}

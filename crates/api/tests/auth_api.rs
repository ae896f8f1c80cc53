//! HTTP integration tests for `/api/auth`.

mod common;

use axum::body::Body;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use sqlx::PgPool;

use common::{body_json, build_test_app, get, get_auth, login, send};

fn logout_request(cookie: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/auth/logout")
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn current_user_returns_stored_profile(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let cookie = login(&pool, "u1").await;

    let response = get_auth(&app.router, "/api/auth/user", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let user = body_json(response).await;
    assert_eq!(user["id"], "u1");
    assert_eq!(user["email"], "u1@example.com");
    assert_eq!(user["name"], "User u1");
    assert!(user["avatarUrl"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn current_user_requires_session(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(&app.router, "/api/auth/user").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["message"], "Missing session cookie");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn repeated_sign_in_keeps_one_user(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let first = login(&pool, "u1").await;
    let second = login(&pool, "u1").await;
    assert_ne!(first, second);

    for cookie in [&first, &second] {
        let response = get_auth(&app.router, "/api/auth/user", cookie).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_ends_only_the_current_session(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let laptop = login(&pool, "u1").await;
    let phone = login(&pool, "u1").await;

    let response = send(&app.router, logout_request(&laptop)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(set_cookie.starts_with("tracker_session=;"));
    assert!(set_cookie.contains("Max-Age=0"));

    let response = get_auth(&app.router, "/api/auth/user", &laptop).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(&app.router, "/api/auth/user", &phone).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn session_token_is_not_stored_in_plaintext(pool: PgPool) {
    let cookie = login(&pool, "u1").await;
    let token = cookie.trim_start_matches("tracker_session=");

    let stored: Vec<String> = sqlx::query_scalar("SELECT id FROM sessions")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_ne!(stored[0], token);
    assert_eq!(
        stored[0],
        tracker_api::auth::session::hash_session_token(token)
    );
}

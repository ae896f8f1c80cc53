//! Cross-cutting HTTP behavior: unknown routes, methods, CORS, request ids.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use sqlx::PgPool;

use common::{build_test_app, get, send};

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_route_is_404(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(&app.router, "/api/nonexistent").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unsupported_method_is_405(pool: PgPool) {
    let app = build_test_app(pool);
    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/api/issues")
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn request_id_is_generated_and_echoed(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(&app.router, "/health").await;
    assert!(response.headers().contains_key("x-request-id"));

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cors_preflight_allows_configured_origin_with_credentials(pool: PgPool) {
    let app = build_test_app(pool);
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/issues")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = send(&app.router, request).await;
    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "http://localhost:5173"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cors_ignores_unknown_origin(pool: PgPool) {
    let app = build_test_app(pool);
    let request = Request::builder()
        .uri("/api/issues")
        .header("origin", "http://evil.test")
        .body(Body::empty())
        .unwrap();

    let response = send(&app.router, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{HeaderValue, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use tracker_api::auth::session::sign_in;
use tracker_api::config::{ServerConfig, SessionConfig};
use tracker_api::router::build_app_router;
use tracker_api::state::AppState;
use tracker_db::models::user::UpsertUser;
use tracker_sync::{MemoryMirror, MirrorSync};

/// Build a test `ServerConfig` with safe defaults and an in-memory mirror.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        db_max_connections: 5,
        session: SessionConfig {
            cookie_name: "tracker_session".to_string(),
            ttl_hours: 1,
            cookie_secure: false,
            cleanup_interval_secs: 3600,
        },
        sheets: None,
    }
}

/// The full application plus handles to observe its mirror.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub mirror: Arc<MemoryMirror>,
    pub sync: MirrorSync,
}

impl TestApp {
    /// Wait for every mirror job queued so far.
    pub async fn flush_mirror(&self) {
        self.sync.flush().await;
    }
}

/// Build the production router over `pool`, with the mirror in memory.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let mirror = Arc::new(MemoryMirror::new());
    let (sync, _worker) = MirrorSync::start(mirror.clone());

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        mirror: sync.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        pool,
        mirror,
        sync,
    }
}

/// Sign `user_id` in and return a `Cookie` header value for the session.
pub async fn login(pool: &PgPool, user_id: &str) -> String {
    let profile = UpsertUser {
        id: user_id.to_string(),
        email: Some(format!("{user_id}@example.com")),
        name: Some(format!("User {user_id}")),
        avatar_url: None,
    };
    let signed_in = sign_in(
        pool,
        &test_config().session,
        &profile,
        serde_json::json!({ "sub": user_id }),
    )
    .await
    .expect("sign-in should succeed");
    format!("tracker_session={}", signed_in.token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: &Router, uri: &str, cookie: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, Some(cookie), None)).await
}

pub async fn post_json(app: &Router, uri: &str, cookie: Option<&str>, body: &Value) -> Response<Body> {
    send(app, request(Method::POST, uri, cookie, Some(body))).await
}

pub async fn put_json(app: &Router, uri: &str, cookie: Option<&str>, body: &Value) -> Response<Body> {
    send(app, request(Method::PUT, uri, cookie, Some(body))).await
}

pub async fn delete(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, request(Method::DELETE, uri, cookie, None)).await
}

/// Send a raw body with a JSON content type.
pub async fn post_raw(app: &Router, uri: &str, cookie: &str, body: &'static str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(COOKIE, cookie)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A valid creation payload.
pub fn new_issue(title: &str) -> Value {
    serde_json::json!({
        "title": title,
        "description": "Steps to reproduce are in the attached log.",
        "type": "issue",
        "impact": "High",
    })
}

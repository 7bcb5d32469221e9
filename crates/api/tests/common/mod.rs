//! Shared harness for the app server integration tests.
//!
//! Every test gets the production router (via `build_app_router`) wired to
//! two throwaway axum servers on ephemeral ports: a stub backend API and a
//! stub render service. Requests are driven with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use reelgen_api::auth::jwt::{encode_session, SessionClaims};
use reelgen_api::config::ServerConfig;
use reelgen_api::cookies::SESSION_COOKIE;
use reelgen_api::router::build_app_router;
use reelgen_api::state::AppState;
use reelgen_core::models::user::AuthPayload;
use reelgen_render::PollConfig;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "hunter22";

// ---------------------------------------------------------------------------
// Stub backend
// ---------------------------------------------------------------------------

/// Counters and captured bodies from the stub backend.
#[derive(Clone, Default)]
pub struct Backend {
    pub tiktok_links: Arc<AtomicUsize>,
    pub google_exchanges: Arc<AtomicUsize>,
    pub refreshes: Arc<AtomicUsize>,
    pub last_link: Arc<Mutex<Option<Value>>>,
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from)
}

fn success(data: Value) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "success", "message": "ok", "data": data })),
    )
}

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "status": "error", "message": message, "data": null })),
    )
}

fn user_json(email: &str) -> Value {
    let role = if email.starts_with("admin") { "admin" } else { "user" };
    json!({ "id": "u1", "name": "Ana", "email": email, "role": role })
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] != PASSWORD {
        return failure(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    success(json!({
        "user": user_json(body["email"].as_str().unwrap_or_default()),
        "accessToken": "a1",
        "refreshToken": "r1",
        "expiresIn": 900
    }))
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "taken@example.com" {
        return failure(StatusCode::CONFLICT, "Email already registered");
    }
    success(user_json(body["email"].as_str().unwrap_or_default()))
}

async fn refresh_token(
    State(backend): State<Backend>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.refreshes.fetch_add(1, Ordering::SeqCst);
    if body["refreshToken"] != "r1" {
        return failure(StatusCode::UNAUTHORIZED, "Refresh token revoked");
    }
    success(json!({ "accessToken": "a2", "refreshToken": "r2", "expiresIn": 900 }))
}

async fn google(
    State(backend): State<Backend>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.google_exchanges.fetch_add(1, Ordering::SeqCst);
    if body["code"] != "google-code" {
        return failure(StatusCode::BAD_REQUEST, "Invalid code");
    }
    success(json!({
        "user": user_json("ana@example.com"),
        "accessToken": "a1",
        "refreshToken": "r1",
        "expiresIn": 900
    }))
}

async fn tiktok_link(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.tiktok_links.fetch_add(1, Ordering::SeqCst);
    if !matches!(bearer(&headers).as_deref(), Some("a1" | "a2")) {
        return failure(StatusCode::UNAUTHORIZED, "Token expired");
    }
    *backend.last_link.lock().unwrap() = Some(body.clone());
    if body["code"] != "tiktok-code" {
        return failure(StatusCode::BAD_REQUEST, "TikTok rejected the code");
    }
    success(json!({ "tiktokUsername": "@ana" }))
}

// ---------------------------------------------------------------------------
// Stub render service
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct RenderService {
    pub submits: Arc<AtomicUsize>,
    pub polls: Arc<AtomicUsize>,
}

async fn render_submit(State(stub): State<RenderService>) -> Json<Value> {
    stub.submits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "renderId": "job-1", "bucketName": "reelgen-renders" }))
}

/// `job-1` reports pending once, then done. `ghost` is unknown. Any other
/// render stays pending forever.
async fn render_progress(
    State(stub): State<RenderService>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    match body["renderId"].as_str() {
        Some("job-1") => {}
        Some("ghost") | None => {
            return (StatusCode::NOT_FOUND, Json(json!({ "message": "unknown render" })));
        }
        Some(_) => {
            return (
                StatusCode::OK,
                Json(json!({ "done": false, "overallProgress": 0.1 })),
            );
        }
    }
    let n = stub.polls.fetch_add(1, Ordering::SeqCst);
    let report = if n == 0 {
        json!({ "done": false, "overallProgress": 0.4, "errors": [] })
    } else {
        json!({ "done": true, "overallProgress": 1.0, "outputFile": "https://cdn.example.com/job-1.mp4" })
    };
    (StatusCode::OK, Json(report))
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Environment for a test configuration pointing at the stubs.
pub fn test_env(backend_url: &str, render_url: &str, static_dir: &str) -> HashMap<String, String> {
    [
        ("PUBLIC_API_BASE_URL", "https://api.example.com"),
        ("BACKEND_URL", backend_url),
        ("APP_URL", "https://app.example.com"),
        ("AUTH_SECRET", "test-secret-that-is-long-enough-for-hmac"),
        ("GOOGLE_CLIENT_ID", "google-client"),
        ("GOOGLE_CLIENT_SECRET", "google-secret"),
        ("TIKTOK_CLIENT_KEY", "tiktok-key"),
        ("TIKTOK_CLIENT_SECRET", "tiktok-secret"),
        ("RENDER_SERVICE_URL", render_url),
        ("RENDER_SERVE_URL", "https://bundle.example.com/site"),
        ("STATIC_DIR", static_dir),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub backend: Backend,
    pub render: RenderService,
    _static_dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let backend = Backend::default();
        let backend_url = serve(
            Router::new()
                .route("/health", axum::routing::get(|| async { "ok" }))
                .route("/auth/login", post(login))
                .route("/auth/register", post(register))
                .route("/auth/refresh-token", post(refresh_token))
                .route("/auth/google", post(google))
                .route("/users/tiktok/link", post(tiktok_link))
                .with_state(backend.clone()),
        )
        .await;

        let render = RenderService::default();
        let render_url = serve(
            Router::new()
                .route("/renders", post(render_submit))
                .route("/renders/progress", post(render_progress))
                .with_state(render.clone()),
        )
        .await;

        let static_dir = tempfile::tempdir().unwrap();
        std::fs::write(static_dir.path().join("index.html"), "<html>reelgen</html>").unwrap();

        let env = test_env(
            &backend_url,
            &render_url,
            static_dir.path().to_str().unwrap(),
        );
        let config = ServerConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        let state = AppState::with_poll_config(
            config.clone(),
            PollConfig {
                interval: Duration::from_millis(10),
                max_attempts: None,
            },
        )
        .unwrap();
        let router = build_app_router(state.clone(), &config);

        Self {
            router,
            state,
            backend,
            render,
            _static_dir: static_dir,
        }
    }

    /// `Cookie` header value for a session with the given role.
    ///
    /// `backend_expires_in` controls whether the embedded backend token is
    /// already expired (zero or negative) or still valid.
    pub fn session_cookie(&self, role: &str, backend_token: &str, backend_expires_in: i64) -> String {
        format!("{SESSION_COOKIE}={}", self.session_token(role, backend_token, backend_expires_in))
    }

    pub fn session_token(&self, role: &str, backend_token: &str, backend_expires_in: i64) -> String {
        self.session_token_for("u1", role, backend_token, backend_expires_in)
    }

    /// Session cookie for a user other than the default `u1`.
    pub fn session_cookie_for(&self, user_id: &str, role: &str) -> String {
        format!("{SESSION_COOKIE}={}", self.session_token_for(user_id, role, "a1", 900))
    }

    pub fn session_token_for(
        &self,
        user_id: &str,
        role: &str,
        backend_token: &str,
        backend_expires_in: i64,
    ) -> String {
        let payload: AuthPayload = serde_json::from_value(json!({
            "user": { "id": user_id, "name": "Ana", "email": "ana@example.com", "role": role },
            "accessToken": backend_token,
            "refreshToken": "r1",
            "expiresIn": 0
        }))
        .unwrap();
        let mut claims = SessionClaims::from_auth(&payload, &self.state.config.session).unwrap();
        // Negative lifetimes stand for an already expired backend token.
        claims.backend_expires_at = claims.iat + backend_expires_in;
        encode_session(&claims, &self.state.config.session).unwrap()
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value, cookie: Option<&str>) -> Response {
    let mut builder = Request::post(uri).header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn delete(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::delete(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .expect("response should redirect")
        .to_str()
        .unwrap()
        .to_string()
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// The `Set-Cookie` entry for `name`, if any.
pub fn set_cookie(response: &Response, name: &str) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&format!("{name}=")))
}

/// `name=value` pair from a `Set-Cookie` entry, for sending back.
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().to_string()
}

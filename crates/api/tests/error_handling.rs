//! Error responses keep the `{ "error", "code" }` shape.

mod common;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use common::{body_json, get, post_json, send, TestApp};
use serde_json::json;

#[tokio::test]
async fn unauthorized_has_json_body() {
    let app = TestApp::spawn().await;

    let response = get(&app.router, "/api/auth/session", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn forbidden_has_json_body() {
    let app = TestApp::spawn().await;
    let cookie = app.session_cookie("user", "a1", 900);

    let response = get(&app.router, "/api/render", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn malformed_json_body_is_rejected() {
    let app = TestApp::spawn().await;
    let request = Request::post("/api/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = send(&app.router, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn backend_down_surfaces_as_500_with_message() {
    let app = TestApp::spawn().await;
    // Point a copy of the state at a closed port.
    let mut config = (*app.state.config).clone();
    config.backend_url = "http://127.0.0.1:9".parse().unwrap();
    let state = reelgen_api::state::AppState::new(config.clone()).unwrap();
    let router = reelgen_api::router::build_app_router(state, &config);

    let response = post_json(
        &router,
        "/api/auth/login",
        json!({ "email": "ana@example.com", "password": common::PASSWORD }),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert!(!json["error"].as_str().unwrap().is_empty());
}

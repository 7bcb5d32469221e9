//! HTTP-level integration tests for the render routes.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, TestApp};
use serde_json::{json, Value};

fn video_data() -> Value {
    json!({
        "videoId": "v1",
        "title": "Ocean facts",
        "scenes": [
            { "imageUrl": "https://cdn.example.com/1.png", "caption": "Whales sing", "durationSecs": 3.0 }
        ]
    })
}

#[tokio::test]
async fn render_requires_session() {
    let app = TestApp::spawn().await;

    let response = post_json(&app.router, "/api/render", json!({ "videoData": video_data() }), None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.render.submits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn render_without_video_data_is_400() {
    let app = TestApp::spawn().await;
    let cookie = app.session_cookie("user", "a1", 900);

    let response = post_json(&app.router, "/api/render", json!({}), Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "videoData is required");
}

#[tokio::test]
async fn render_with_invalid_scene_is_not_submitted() {
    let app = TestApp::spawn().await;
    let cookie = app.session_cookie("user", "a1", 900);
    let mut data = video_data();
    data["scenes"][0]["imageUrl"] = json!("not a url");

    let response = post_json(&app.router, "/api/render", json!({ "videoData": data }), Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.render.submits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn render_then_status_reports_progress() {
    let app = TestApp::spawn().await;
    let cookie = app.session_cookie("user", "a1", 900);

    let submitted = post_json(&app.router, "/api/render", json!({ "videoData": video_data() }), Some(&cookie)).await;
    assert_eq!(submitted.status(), StatusCode::OK);
    let job = body_json(submitted).await;
    assert_eq!(job, json!({ "renderId": "job-1", "bucketName": "reelgen-renders" }));

    let pending = post_json(&app.router, "/api/render-status", json!({ "renderId": "job-1" }), Some(&cookie)).await;
    assert_eq!(
        body_json(pending).await,
        json!({ "done": false, "progress": 0.4 })
    );

    let done = post_json(&app.router, "/api/render-status", json!({ "renderId": "job-1" }), Some(&cookie)).await;
    assert_eq!(
        body_json(done).await,
        json!({ "done": true, "progress": 1.0, "url": "https://cdn.example.com/job-1.mp4" })
    );
}

#[tokio::test]
async fn render_status_without_id_is_400() {
    let app = TestApp::spawn().await;
    let cookie = app.session_cookie("user", "a1", 900);

    let response = post_json(&app.router, "/api/render-status", json!({}), Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn render_status_upstream_error_is_500() {
    let app = TestApp::spawn().await;
    let cookie = app.session_cookie("user", "a1", 900);

    let response = post_json(&app.router, "/api/render-status", json!({ "renderId": "ghost" }), Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "RENDER_ERROR");
    assert!(json["error"].as_str().unwrap().contains("404"));
}

// ---------------------------------------------------------------------------
// Server-side tracking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tracked_render_reaches_succeeded() {
    let app = TestApp::spawn().await;
    let cookie = app.session_cookie("user", "a1", 900);

    let submitted = post_json(
        &app.router,
        "/api/render",
        json!({ "videoData": video_data(), "track": true }),
        Some(&cookie),
    )
    .await;
    assert_eq!(submitted.status(), StatusCode::OK);

    let mut last = Value::Null;
    for _ in 0..100 {
        let response = get(&app.router, "/api/render/job-1", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        last = body_json(response).await;
        if last["state"] == "succeeded" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(
        last,
        json!({ "renderId": "job-1", "state": "succeeded", "url": "https://cdn.example.com/job-1.mp4" })
    );
}

#[tokio::test]
async fn untracked_render_is_404() {
    let app = TestApp::spawn().await;
    let cookie = app.session_cookie("user", "a1", 900);

    let response = get(&app.router, "/api/render/nope", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(&app.router, "/api/render/nope", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_tracked_render() {
    let app = TestApp::spawn().await;
    let cookie = app.session_cookie("user", "a1", 900);
    app.state.renders.track("slow", "u1").await.unwrap();

    let response = delete(&app.router, "/api/render/slow", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let mut state = Value::Null;
    for _ in 0..100 {
        state = body_json(get(&app.router, "/api/render/slow", Some(&cookie)).await).await;
        if state["state"] != "rendering" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(state["state"], "cancelled");
}

#[tokio::test]
async fn listing_tracked_renders_is_admin_only() {
    let app = TestApp::spawn().await;
    app.state.renders.track("job-1", "u1").await.unwrap();

    let user = app.session_cookie("user", "a1", 900);
    let response = get(&app.router, "/api/render", Some(&user)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = app.session_cookie("admin", "a1", 900);
    let response = get(&app.router, "/api/render", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json[0]["renderId"], "job-1");
    assert_eq!(json[0]["ownerId"], "u1");
}

#[tokio::test]
async fn tracked_render_is_hidden_from_other_users() {
    let app = TestApp::spawn().await;
    app.state.renders.track("slow", "u1").await.unwrap();
    let mallory = app.session_cookie_for("mallory", "user");

    let response = get(&app.router, "/api/render/slow", Some(&mallory)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = delete(&app.router, "/api/render/slow", Some(&mallory)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let owner = app.session_cookie("user", "a1", 900);
    let json = body_json(get(&app.router, "/api/render/slow", Some(&owner)).await).await;
    assert_eq!(json["state"], "rendering");

    let admin = app.session_cookie_for("root", "admin");
    let response = delete(&app.router, "/api/render/slow", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// End-to-end tests for the HTTP surface, driving the router directly with
// tower's oneshot so no socket is needed.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use velotype::{db::Store, server, service::Service};

fn app() -> Router {
    let store = Store::open_in_memory().expect("in-memory store");
    server::router(Arc::new(Service::new(store)), None)
}

fn app_with_token(token: &str) -> Router {
    let store = Store::open_in_memory().expect("in-memory store");
    server::router(Arc::new(Service::new(store)), Some(token.to_string()))
}

async fn request(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    request_with_headers(app, method, uri, body, &[]).await
}

async fn request_with_headers(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let req = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };
    let res = app.clone().oneshot(req).await.expect("response");
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn submit(app: &Router, name: &str, wpm: f64, accuracy: f64, difficulty: &str) -> Value {
    let (status, body) = request(
        app,
        "POST",
        "/api/scores",
        Some(json!({
            "name": name,
            "wpm": wpm,
            "accuracy": accuracy,
            "difficulty": difficulty,
            "mode": "normal",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "submit failed: {body}");
    body
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = request(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_fields_are_rejected_without_a_write() {
    let app = app();
    let (status, body) = request(&app, "POST", "/api/scores", Some(json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = request(&app, "GET", "/api/admin/scores", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn malformed_fields_are_a_400_json_error() {
    let app = app();

    // an unknown enum value fails deserialization, not with axum's 422
    let (status, body) = request(
        &app,
        "POST",
        "/api/scores",
        Some(json!({
            "name": "x",
            "wpm": 50.0,
            "accuracy": 95.0,
            "difficulty": "extreme",
            "mode": "normal",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // same taxonomy for a wrongly-typed field on the auth routes
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/signup",
        Some(json!({ "email": 42, "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, scores) = request(&app, "GET", "/api/admin/scores", None).await;
    assert_eq!(scores, json!([]));
}

#[tokio::test]
async fn rank_is_one_plus_strictly_faster_count() {
    let app = app();
    let first = submit(&app, "a", 80.0, 95.0, "easy").await;
    assert_eq!(first["rank"], 1);
    let second = submit(&app, "b", 60.0, 90.0, "easy").await;
    assert_eq!(second["rank"], 2);
    // equal wpm ties share rank 1
    let third = submit(&app, "c", 80.0, 100.0, "easy").await;
    assert_eq!(third["rank"], 1);
}

#[tokio::test]
async fn leaderboard_caps_at_ten_and_sorts_descending() {
    let app = app();
    for i in 0..12 {
        submit(&app, "x", 40.0 + i as f64, 95.0, "medium").await;
    }
    let (status, body) = request(&app, "GET", "/api/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().expect("array");
    assert_eq!(rows.len(), 10);
    let speeds: Vec<f64> = rows.iter().map(|r| r["wpm"].as_f64().unwrap()).collect();
    for pair in speeds.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
    assert_eq!(speeds[0], 51.0);
}

#[tokio::test]
async fn leaderboard_difficulty_filter_and_all_sentinel() {
    let app = app();
    submit(&app, "a", 50.0, 95.0, "easy").await;
    submit(&app, "b", 90.0, 95.0, "hard").await;

    let (_, easy) = request(&app, "GET", "/api/leaderboard?difficulty=easy", None).await;
    assert_eq!(easy.as_array().unwrap().len(), 1);
    assert_eq!(easy[0]["name"], "a");

    let (_, all) = request(&app, "GET", "/api/leaderboard?difficulty=all", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    // an unknown tier matches nothing rather than erroring
    let (status, none) = request(&app, "GET", "/api/leaderboard?difficulty=extreme", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn user_progress_requires_a_name() {
    let app = app();
    let (status, body) = request(&app, "GET", "/api/user-progress", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn user_progress_returns_all_attempts_oldest_first() {
    let app = app();
    submit(&app, "p", 30.0, 80.0, "easy").await;
    submit(&app, "p", 50.0, 90.0, "hard").await;
    submit(&app, "q", 99.0, 99.0, "easy").await;

    let (status, body) = request(&app, "GET", "/api/user-progress?name=p", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["wpm"], 30.0);
    assert_eq!(rows[1]["wpm"], 50.0);
    let dates: Vec<&str> = rows.iter().map(|r| r["date"].as_str().unwrap()).collect();
    assert!(dates[0] <= dates[1]);
}

#[tokio::test]
async fn daily_challenge_is_identical_across_requests() {
    let app = app();
    let (status, first) = request(&app, "GET", "/api/daily-challenge", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = request(&app, "GET", "/api/daily-challenge", None).await;
    assert!(first["paragraph"].is_string());
    assert_eq!(first, second);
}

#[tokio::test]
async fn deleting_a_missing_score_succeeds_and_changes_nothing() {
    let app = app();
    submit(&app, "a", 70.0, 95.0, "easy").await;

    let (status, body) = request(&app, "DELETE", "/api/admin/scores/999999", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, board) = request(&app, "GET", "/api/leaderboard", None).await;
    assert_eq!(board.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reset_empties_the_leaderboard_and_is_idempotent() {
    let app = app();
    submit(&app, "a", 70.0, 95.0, "easy").await;

    let (status, body) = request(&app, "POST", "/api/admin/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // resetting an already-empty table is still a success
    let (status, _) = request(&app, "POST", "/api/admin/reset", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, board) = request(&app, "GET", "/api/leaderboard", None).await;
    assert_eq!(board, json!([]));
    let (_, progress) = request(&app, "GET", "/api/user-progress?name=a", None).await;
    assert_eq!(progress, json!([]));
}

#[tokio::test]
async fn admin_routes_honor_the_configured_token() {
    let app = app_with_token("sekrit");

    let (status, body) = request(&app, "GET", "/api/admin/scores", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = request_with_headers(
        &app,
        "GET",
        "/api/admin/scores",
        None,
        &[("x-admin-token", "wrong")],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = request_with_headers(
        &app,
        "GET",
        "/api/admin/scores",
        None,
        &[("x-admin-token", "sekrit")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    // non-admin routes stay open
    let (status, _) = request(&app, "GET", "/api/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn signup_then_signin_round_trip() {
    let app = app();
    let creds = json!({ "email": "ada@example.com", "password": "pw" });

    let (status, body) = request(&app, "POST", "/api/auth/signup", Some(creds.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["needsConfirmation"], false);

    // duplicate email is a 400, not a 500
    let (status, body) = request(&app, "POST", "/api/auth/signup", Some(creds.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = request(&app, "POST", "/api/auth/signin", Some(creds)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/signin",
        Some(json!({ "email": "ada@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_credentials_are_a_400() {
    let app = app();
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/signup",
        Some(json!({ "email": "a@b.c" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

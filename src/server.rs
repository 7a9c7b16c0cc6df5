// src/server.rs
//
// HTTP/JSON front end over the shared service. Error bodies are always
// `{"error": message}` with 400/401/429/500 mapped in error.rs.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Query, Request, State},
    http::HeaderMap,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::config::Config;
use crate::db::{Difficulty, Score, Store};
use crate::error::{AppError, Result};
use crate::service::{Credentials, NewScore, Recorded, Service, UserInfo};

#[derive(Clone)]
pub struct ServerState {
    service: Arc<Service>,
    admin_token: Option<String>,
}

impl ServerState {
    /// Admin endpoints are guarded only when a token is configured.
    fn require_admin(&self, headers: &HeaderMap) -> Result<()> {
        let Some(expected) = &self.admin_token else {
            return Ok(());
        };
        let provided = headers
            .get("x-admin-token")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if provided == expected.as_str() {
            Ok(())
        } else {
            Err(AppError::auth("admin token required"))
        }
    }
}

/// JSON request body that reports deserialization failures as 400s with the
/// usual `{"error": message}` shape instead of axum's plain-text 422.
struct Body<T>(T);

impl<S, T> FromRequest<S> for Body<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

pub fn router(service: Arc<Service>, admin_token: Option<String>) -> Router {
    let state = ServerState {
        service,
        admin_token,
    };
    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/signin", post(signin))
        .route("/api/leaderboard", get(leaderboard))
        .route("/api/scores", post(create_score))
        .route("/api/user-progress", get(user_progress))
        .route("/api/daily-challenge", get(daily_challenge))
        .route("/api/admin/scores", get(admin_scores))
        .route("/api/admin/scores/{id}", delete(admin_delete))
        .route("/api/admin/reset", post(admin_reset))
        .with_state(state)
}

/// Bind and serve until the process is terminated.
pub fn run(config: Config) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let store = Store::open(&config.db_path)?;
        let service = Arc::new(Service::new(store));
        let app = router(service, config.admin_token);
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
        info!(port = config.port, db = %config.db_path.display(), "listening");
        axum::serve(listener, app).await?;
        Ok(())
    })
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn signup(
    State(state): State<ServerState>,
    Body(creds): Body<Credentials>,
) -> Result<Json<UserInfo>> {
    Ok(Json(state.service.signup(creds)?))
}

async fn signin(
    State(state): State<ServerState>,
    Body(creds): Body<Credentials>,
) -> Result<Json<UserInfo>> {
    Ok(Json(state.service.signin(creds)?))
}

#[derive(Debug, Deserialize)]
struct LeaderboardParams {
    difficulty: Option<String>,
}

async fn leaderboard(
    State(state): State<ServerState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<Vec<Score>>> {
    let filter = match params.difficulty.as_deref() {
        None | Some("all") | Some("") => None,
        Some(other) => match Difficulty::parse(other) {
            Some(d) => Some(d),
            // unknown tier matches nothing rather than failing the request
            None => return Ok(Json(Vec::new())),
        },
    };
    Ok(Json(state.service.leaderboard(filter)?))
}

async fn create_score(
    State(state): State<ServerState>,
    Body(attempt): Body<NewScore>,
) -> Result<Json<Recorded>> {
    Ok(Json(state.service.record(attempt)?))
}

#[derive(Debug, Deserialize)]
struct ProgressParams {
    name: Option<String>,
}

async fn user_progress(
    State(state): State<ServerState>,
    Query(params): Query<ProgressParams>,
) -> Result<Json<Vec<crate::db::ProgressPoint>>> {
    let name = params.name.unwrap_or_default();
    Ok(Json(state.service.progress(&name)?))
}

async fn daily_challenge(State(state): State<ServerState>) -> Result<Json<Value>> {
    let today = Utc::now().date_naive();
    let paragraph = state.service.daily_paragraph(today)?;
    Ok(Json(json!({ "paragraph": paragraph })))
}

async fn admin_scores(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Score>>> {
    state.require_admin(&headers)?;
    Ok(Json(state.service.admin_list()?))
}

async fn admin_delete(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    state.require_admin(&headers)?;
    state.service.admin_delete(id)?;
    Ok(Json(json!({ "success": true })))
}

async fn admin_reset(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    state.require_admin(&headers)?;
    state.service.admin_reset()?;
    Ok(Json(json!({ "success": true })))
}

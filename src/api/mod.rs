//! Control API — the HTTP surface over the job scheduler.

pub mod auth;

use std::sync::Arc;

use axum::{
    Json, Router, middleware,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::jobs::{Job, JobScheduler, JobStatus};
use crate::llm::{ChatMessage, ChatProvider, planner};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<JobScheduler>,
    /// Chat provider for `/chat` and `/suggest` (None when unconfigured).
    pub llm: Option<Arc<dyn ChatProvider>>,
    /// Access key for the gate; None disables it.
    pub api_access_key: Option<String>,
}

/// Build the control API router.
///
/// Everything except `/health` sits behind the access-key gate; CORS is
/// wide open so browser control panels can talk to the service directly.
pub fn api_routes(
    scheduler: Arc<JobScheduler>,
    llm: Option<Arc<dyn ChatProvider>>,
    api_access_key: Option<String>,
) -> Router {
    let state = AppState {
        scheduler,
        llm,
        api_access_key,
    };

    Router::new()
        .route("/chat", post(chat))
        .route("/jobs", get(list_jobs))
        .route("/jobs/{id}", get(get_job))
        .route("/jobs/create", post(create_job))
        .route("/suggest", post(suggest))
        .route("/tasks", get(list_tasks))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Request / response shapes ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CreateJobRequest {
    task: String,
    #[serde(default = "empty_payload")]
    payload: serde_json::Value,
}

fn empty_payload() -> serde_json::Value {
    serde_json::json!({})
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct SuggestRequest {
    prompt: String,
}

/// Trimmed listing view: status and timing only, no payload/result dump.
#[derive(Debug, Serialize)]
struct JobSummary {
    id: Uuid,
    task: String,
    status: JobStatus,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            task: job.task.clone(),
            status: job.status,
            created_at: job.created_at,
            started_at: job.started_at,
            finished_at: job.finished_at,
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "ok": true,
        "time": Utc::now(),
    }))
}

async fn create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> impl IntoResponse {
    let task = req.task.trim();
    if task.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({"detail": "task is required"})),
        );
    }

    match state.scheduler.submit(task, req.payload).await {
        Ok(job_id) => (
            StatusCode::OK,
            Json(serde_json::json!({"job_id": job_id})),
        ),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({"detail": e.to_string()})),
        ),
    }
}

async fn list_jobs(State(state): State<AppState>) -> impl IntoResponse {
    let jobs = state.scheduler.store().list().await;
    let summaries: Vec<JobSummary> = jobs.iter().map(JobSummary::from).collect();
    Json(summaries)
}

async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    // An id we never issued is just an absent job, not a client error.
    let job = match Uuid::parse_str(&id) {
        Ok(id) => state.scheduler.store().get(id).await,
        Err(_) => None,
    };

    match job {
        Some(job) => (StatusCode::OK, Json(serde_json::json!(job))),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"detail": "job not found"})),
        ),
    }
}

async fn list_tasks(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "tasks": state.scheduler.registry().names(),
    }))
}

async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> impl IntoResponse {
    let Some(llm) = &state.llm else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"detail": "LLM client not configured"})),
        );
    };

    match llm.chat(&req.messages, None).await {
        Ok(out) => (StatusCode::OK, Json(serde_json::json!({"output": out}))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"detail": format!("Chat error: {e}")})),
        ),
    }
}

async fn suggest(
    State(state): State<AppState>,
    Json(req): Json<SuggestRequest>,
) -> impl IntoResponse {
    let Some(llm) = &state.llm else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"detail": "LLM client not configured"})),
        );
    };

    match planner::suggest_from_text(llm.as_ref(), &req.prompt).await {
        Ok(suggestion) => (
            StatusCode::OK,
            Json(serde_json::json!({"ok": true, "suggestion": suggestion})),
        ),
        // The model producing unusable JSON is an expected outcome, not a
        // server fault; mirror it back to the operator.
        Err(crate::error::LlmError::InvalidResponse { reason }) => (
            StatusCode::OK,
            Json(serde_json::json!({"ok": false, "error": reason})),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"detail": format!("Suggest error: {e}")})),
        ),
    }
}

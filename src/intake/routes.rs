//! REST endpoints for running intake sessions over HTTP.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::engine::SubmitOutcome;
use super::manager::SessionManager;
use super::state::RawAnswer;
use crate::error::SessionError;

/// Shared state for intake routes.
#[derive(Clone)]
pub struct IntakeRouteState {
    pub manager: Arc<SessionManager>,
}

#[derive(Deserialize)]
struct AnswerRequest {
    answer: RawAnswer,
}

fn parse_id(id: &str) -> Result<Uuid, (StatusCode, Json<serde_json::Value>)> {
    Uuid::parse_str(id).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid session ID"})),
        )
    })
}

fn outcome_json(outcome: &SubmitOutcome) -> serde_json::Value {
    match outcome {
        SubmitOutcome::Accepted => json!({"status": "accepted"}),
        SubmitOutcome::Rejected(reason) => json!({"status": "rejected", "error": reason.to_string()}),
        SubmitOutcome::Ended => json!({"status": "ended"}),
        SubmitOutcome::Finished => json!({"status": "finished"}),
    }
}

async fn health(State(state): State<IntakeRouteState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.manager.count().await,
    }))
}

/// POST /api/sessions
async fn create_session(State(state): State<IntakeRouteState>) -> impl IntoResponse {
    let view = state.manager.create().await;
    (StatusCode::CREATED, Json(json!(view)))
}

/// GET /api/sessions/{id}
///
/// Re-renders the session; never advances it.
async fn get_session(
    State(state): State<IntakeRouteState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.manager.view(id).await {
        Ok(view) => (StatusCode::OK, Json(json!(view))),
        Err(e) => (StatusCode::NOT_FOUND, Json(json!({"error": e.to_string()}))),
    }
}

/// POST /api/sessions/{id}/answer
///
/// Body: `{"answer": "text"}` or `{"answer": ["Label", ...]}`.
async fn submit_answer(
    State(state): State<IntakeRouteState>,
    Path(id): Path<String>,
    Json(body): Json<AnswerRequest>,
) -> impl IntoResponse {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.manager.submit(id, body.answer).await {
        Ok((outcome, view)) => {
            let mut response = outcome_json(&outcome);
            response["session"] = json!(view);
            let status = match outcome {
                SubmitOutcome::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::OK,
            };
            (status, Json(response))
        }
        Err(e @ SessionError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, Json(json!({"error": e.to_string()})))
        }
        Err(e @ SessionError::Closed { .. }) => {
            let session = state.manager.view(id).await.ok();
            (
                StatusCode::CONFLICT,
                Json(json!({"error": e.to_string(), "session": session})),
            )
        }
    }
}

/// DELETE /api/sessions/{id}
async fn delete_session(
    State(state): State<IntakeRouteState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if state.manager.remove(id).await {
        (StatusCode::OK, Json(json!({"status": "deleted"})))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Session not found"})),
        )
    }
}

/// Build the intake REST routes.
pub fn intake_routes(state: IntakeRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/{id}",
            get(get_session).delete(delete_session),
        )
        .route("/api/sessions/{id}/answer", post(submit_answer))
        .with_state(state)
}

//! Axum route handlers for the Analysis API.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::pipeline::Advisor;
use crate::analysis::session::{
    AnalysisView, JobRecommendations, SessionSnapshot, SessionStore, ViewState,
};
use crate::errors::AppError;
use crate::extraction::extract_pdf_text;
use crate::state::AppState;

/// Multipart field carrying the resume.
const UPLOAD_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub session_id: Uuid,
    pub view: AnalysisView,
    #[serde(flatten)]
    pub state: ViewState<String>,
}

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub state: ViewState<JobRecommendations>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyses
///
/// Extracts the resume text, opens a session and starts the summary, skill gap
/// and roadmap views in the background. Poll the session to watch them fill in.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let bytes = read_upload(multipart).await?;
    let size = bytes.len();

    let resume_text = tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let characters = resume_text.chars().count();
    let session_id = state.sessions.create(resume_text).await;
    info!("Session {session_id}: extracted {characters} characters from {size} byte upload");

    for view in AnalysisView::ALL {
        spawn_view(&state.advisor, &state.sessions, session_id, view).await;
    }

    let snapshot = session_snapshot(&state.sessions, session_id).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /api/v1/analyses/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(session_snapshot(&state.sessions, session_id).await?))
}

/// GET /api/v1/analyses/:id/views/:view
///
/// Returns the cached state of one view; never triggers a computation.
pub async fn handle_get_view(
    State(state): State<AppState>,
    Path((session_id, view)): Path<(Uuid, String)>,
) -> Result<Json<ViewResponse>, AppError> {
    let view = parse_view(&view)?;
    let view_state = state
        .sessions
        .view(session_id, view)
        .await
        .ok_or_else(|| session_not_found(session_id))?;

    Ok(Json(ViewResponse {
        session_id,
        view,
        state: view_state,
    }))
}

/// POST /api/v1/analyses/:id/views/:view
///
/// Recomputes one view in full and waits for the result. Other views keep
/// their cached state.
pub async fn handle_rerun_view(
    State(state): State<AppState>,
    Path((session_id, view)): Path<(Uuid, String)>,
) -> Result<Json<ViewResponse>, AppError> {
    let view = parse_view(&view)?;
    let resume_text = state
        .sessions
        .resume_text(session_id)
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    let ticket = state
        .sessions
        .start_view(session_id, view)
        .await
        .ok_or_else(|| session_not_found(session_id))?;

    let view_state = state.advisor.run_view(view, &resume_text).await;
    state
        .sessions
        .finish_view(session_id, view, ticket, view_state.clone())
        .await;

    Ok(Json(ViewResponse {
        session_id,
        view,
        state: view_state,
    }))
}

/// POST /api/v1/analyses/:id/jobs
///
/// Derives search keywords from the ready summary and queries both job boards.
/// Board failures show up inside their own panel, not as an HTTP error.
pub async fn handle_recommend_jobs(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<JobsResponse>, AppError> {
    let summary = match state.sessions.view(session_id, AnalysisView::Summary).await {
        None => return Err(session_not_found(session_id)),
        Some(ViewState::Ready { content }) => content,
        Some(ViewState::Failed { .. }) => {
            return Err(AppError::Conflict(
                "Summary failed; re-run the summary view before requesting jobs".to_string(),
            ))
        }
        Some(ViewState::Idle | ViewState::Loading) => {
            return Err(AppError::Conflict(
                "Summary is still being generated".to_string(),
            ))
        }
    };

    let ticket = state
        .sessions
        .start_jobs(session_id)
        .await
        .ok_or_else(|| session_not_found(session_id))?;

    let jobs = state.advisor.recommend_jobs(&summary).await;
    state
        .sessions
        .finish_jobs(session_id, ticket, jobs.clone())
        .await;

    Ok(Json(JobsResponse {
        session_id,
        state: jobs,
    }))
}

/// DELETE /api/v1/analyses/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(session_id).await {
        info!("Session {session_id} dismissed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(session_id))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_upload(mut multipart: Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        return Ok(bytes);
    }
    Err(AppError::Validation(format!(
        "Missing multipart field '{UPLOAD_FIELD}'"
    )))
}

/// Marks the view loading and computes it on a background task.
async fn spawn_view(advisor: &Arc<Advisor>, sessions: &SessionStore, id: Uuid, view: AnalysisView) {
    let Some(ticket) = sessions.start_view(id, view).await else {
        return;
    };
    let Some(resume_text) = sessions.resume_text(id).await else {
        return;
    };

    let advisor = Arc::clone(advisor);
    let sessions = sessions.clone();
    tokio::spawn(async move {
        let state = advisor.run_view(view, &resume_text).await;
        if !sessions.finish_view(id, view, ticket, state).await {
            info!("Session {id}: dropped stale {view} result");
        }
    });
}

async fn session_snapshot(sessions: &SessionStore, id: Uuid) -> Result<SessionSnapshot, AppError> {
    sessions
        .snapshot(id)
        .await
        .ok_or_else(|| session_not_found(id))
}

fn parse_view(raw: &str) -> Result<AnalysisView, AppError> {
    raw.parse::<AnalysisView>().map_err(AppError::Validation)
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Analysis session {id} not found"))
}

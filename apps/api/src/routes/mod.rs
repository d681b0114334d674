pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/analyses", post(handlers::handle_upload))
        .route(
            "/api/v1/analyses/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/analyses/:id/views/:view",
            get(handlers::handle_get_view).post(handlers::handle_rerun_view),
        )
        .route(
            "/api/v1/analyses/:id/jobs",
            post(handlers::handle_recommend_jobs),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

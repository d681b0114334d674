use std::sync::Arc;

use crate::analysis::pipeline::Advisor;
use crate::analysis::session::SessionStore;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Stage pipeline wired to the completion client and both job boards.
    pub advisor: Arc<Advisor>,
    /// Per-upload sessions. Each session is isolated from every other.
    pub sessions: SessionStore,
}

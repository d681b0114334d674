//! Session state — one per uploaded resume.
//!
//! A session owns the extracted resume text and a result cache keyed by stage.
//! Reading a view never recomputes it; a re-trigger replaces only that stage's
//! entry. Every write carries the ticket handed out when the stage started, so a
//! slow, superseded run cannot overwrite a newer result.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::jobs::{JobPosting, Provider};

/// The three order-insensitive views computed from the resume text.
/// Serialized names match the route slugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisView {
    Summary,
    SkillGaps,
    Roadmap,
}

impl AnalysisView {
    pub const ALL: [AnalysisView; 3] = [
        AnalysisView::Summary,
        AnalysisView::SkillGaps,
        AnalysisView::Roadmap,
    ];

    /// Path segment used by the HTTP routes.
    pub fn slug(self) -> &'static str {
        match self {
            AnalysisView::Summary => "summary",
            AnalysisView::SkillGaps => "skill-gaps",
            AnalysisView::Roadmap => "roadmap",
        }
    }
}

impl fmt::Display for AnalysisView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for AnalysisView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisView::ALL
            .into_iter()
            .find(|v| v.slug() == s)
            .ok_or_else(|| format!("Unknown view '{s}' (expected summary, skill-gaps or roadmap)"))
    }
}

/// Render state of one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViewState<T> {
    /// Not requested yet (job recommendations wait for an explicit action).
    Idle,
    Loading,
    Ready { content: T },
    Failed { error: String },
}

impl<T> ViewState<T> {
    #[cfg(test)]
    pub fn content(&self) -> Option<&T> {
        match self {
            ViewState::Ready { content } => Some(content),
            _ => None,
        }
    }
}

/// One board's half of the job recommendations view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPanel {
    pub provider: Provider,
    #[serde(flatten)]
    pub state: PanelState,
}

/// Zero postings is its own state, distinct from a failed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelState {
    Postings { postings: Vec<JobPosting> },
    NoResults,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecommendations {
    pub keywords: String,
    pub limit: u32,
    pub panels: Vec<JobPanel>,
}

struct Slot<T> {
    ticket: u64,
    state: ViewState<T>,
}

impl<T> Slot<T> {
    fn new(state: ViewState<T>) -> Self {
        Self { ticket: 0, state }
    }

    fn start(&mut self) -> u64 {
        self.ticket += 1;
        self.state = ViewState::Loading;
        self.ticket
    }

    fn finish(&mut self, ticket: u64, state: ViewState<T>) -> bool {
        if self.ticket != ticket {
            return false;
        }
        self.state = state;
        true
    }
}

struct Session {
    created_at: DateTime<Utc>,
    resume_text: Arc<str>,
    views: HashMap<AnalysisView, Slot<String>>,
    jobs: Slot<JobRecommendations>,
}

/// Everything a client needs to render all four views of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub characters: usize,
    pub summary: ViewState<String>,
    pub skill_gaps: ViewState<String>,
    pub roadmap: ViewState<String>,
    pub jobs: ViewState<JobRecommendations>,
}

/// In-process session store. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session with every view idle.
    pub async fn create(&self, resume_text: String) -> Uuid {
        let id = Uuid::new_v4();
        let session = Session {
            created_at: Utc::now(),
            resume_text: Arc::from(resume_text),
            views: AnalysisView::ALL
                .into_iter()
                .map(|v| (v, Slot::new(ViewState::Idle)))
                .collect(),
            jobs: Slot::new(ViewState::Idle),
        };
        self.inner.write().await.insert(id, session);
        id
    }

    pub async fn resume_text(&self, id: Uuid) -> Option<Arc<str>> {
        self.inner
            .read()
            .await
            .get(&id)
            .map(|s| Arc::clone(&s.resume_text))
    }

    /// Marks a view as loading and returns the ticket its result must carry.
    pub async fn start_view(&self, id: Uuid, view: AnalysisView) -> Option<u64> {
        let mut sessions = self.inner.write().await;
        let slot = sessions.get_mut(&id)?.views.get_mut(&view)?;
        Some(slot.start())
    }

    /// Stores a finished view. Returns false if the session is gone or the
    /// ticket was superseded by a newer run.
    pub async fn finish_view(
        &self,
        id: Uuid,
        view: AnalysisView,
        ticket: u64,
        state: ViewState<String>,
    ) -> bool {
        let mut sessions = self.inner.write().await;
        match sessions.get_mut(&id).and_then(|s| s.views.get_mut(&view)) {
            Some(slot) => slot.finish(ticket, state),
            None => false,
        }
    }

    pub async fn view(&self, id: Uuid, view: AnalysisView) -> Option<ViewState<String>> {
        self.inner
            .read()
            .await
            .get(&id)
            .and_then(|s| s.views.get(&view))
            .map(|slot| slot.state.clone())
    }

    pub async fn start_jobs(&self, id: Uuid) -> Option<u64> {
        let mut sessions = self.inner.write().await;
        Some(sessions.get_mut(&id)?.jobs.start())
    }

    pub async fn finish_jobs(
        &self,
        id: Uuid,
        ticket: u64,
        state: ViewState<JobRecommendations>,
    ) -> bool {
        let mut sessions = self.inner.write().await;
        match sessions.get_mut(&id) {
            Some(session) => session.jobs.finish(ticket, state),
            None => false,
        }
    }

    pub async fn snapshot(&self, id: Uuid) -> Option<SessionSnapshot> {
        let sessions = self.inner.read().await;
        let session = sessions.get(&id)?;
        let view = |v: AnalysisView| {
            session
                .views
                .get(&v)
                .map(|slot| slot.state.clone())
                .unwrap_or(ViewState::Idle)
        };
        Some(SessionSnapshot {
            session_id: id,
            created_at: session.created_at,
            characters: session.resume_text.chars().count(),
            summary: view(AnalysisView::Summary),
            skill_gaps: view(AnalysisView::SkillGaps),
            roadmap: view(AnalysisView::Roadmap),
            jobs: session.jobs.state.clone(),
        })
    }

    /// Dismisses a session and everything derived from it.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }

    /// Drops every session created at least `ttl` ago. Returns how many went.
    pub async fn evict_expired(&self, ttl: Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !is_expired(session.created_at, now, ttl));
        before - sessions.len()
    }
}

fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    match now.signed_duration_since(created_at).to_std() {
        Ok(age) => age >= ttl,
        // created in the future relative to `now`: clock skew, keep it
        Err(_) => false,
    }
}

/// Periodically evicts sessions older than `ttl`.
pub fn spawn_session_sweeper(store: SessionStore, ttl: Duration) -> JoinHandle<()> {
    let period = ttl.min(Duration::from_secs(60)).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let evicted = store.evict_expired(ttl).await;
            if evicted > 0 {
                info!("Evicted {evicted} expired session(s)");
            }
        }
    })
}

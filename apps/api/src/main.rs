mod analysis;
mod config;
mod errors;
mod extraction;
mod jobs;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::pipeline::Advisor;
use crate::analysis::session::{spawn_session_sweeper, SessionStore};
use crate::config::Config;
use crate::jobs::apify::{LinkedinBoard, NaukriBoard};
use crate::jobs::JobSearchClient;
use crate::llm_client::HostedCompletionClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobScout v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion client
    let completion = HostedCompletionClient::new(config.completion.clone())?;
    info!(
        "Completion client initialized (model: {}, timeout: {:?})",
        completion.model(),
        config.completion.timeout
    );

    // Initialize job boards
    let linkedin = LinkedinBoard::linkedin(&config.job_search)?;
    let naukri = NaukriBoard::naukri(&config.job_search)?;
    info!(
        "Job boards initialized (limit: {}, timeout: {:?})",
        config.job_search.limit, config.job_search.timeout
    );

    let boards: [Arc<dyn JobSearchClient>; 2] = [Arc::new(linkedin), Arc::new(naukri)];
    let advisor = Advisor::new(Arc::new(completion), boards, config.job_search.limit);

    // Session store with background expiry
    let sessions = SessionStore::new();
    spawn_session_sweeper(sessions.clone(), config.session_ttl);
    info!("Session TTL: {:?}", config.session_ttl);

    // Build app state
    let state = AppState {
        config: config.clone(),
        advisor: Arc::new(advisor),
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web front end has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

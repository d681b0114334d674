use std::time::Duration;

use anyhow::{Context, Result};

use crate::jobs::apify::{DEFAULT_APIFY_BASE_URL, DEFAULT_LINKEDIN_ACTOR, DEFAULT_NAUKRI_ACTOR};
use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    /// Sessions older than this are evicted, dismissed or not.
    pub session_ttl: Duration,
    pub completion: CompletionConfig,
    pub job_search: JobSearchConfig,
}

/// Settings for the hosted chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Settings shared by both job boards.
#[derive(Debug, Clone)]
pub struct JobSearchConfig {
    pub apify_token: String,
    pub apify_base_url: String,
    pub linkedin_actor: String,
    pub naukri_actor: String,
    /// Location filter sent to the LinkedIn actor.
    pub location: String,
    pub limit: u32,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: optional_env("RUST_LOG", "info"),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            session_ttl: Duration::from_secs(parse_env("SESSION_TTL_SECS", 3600)?),
            completion: CompletionConfig {
                api_key: require_env("HF_TOKEN")?,
                base_url: optional_env("COMPLETION_BASE_URL", DEFAULT_BASE_URL),
                model: optional_env("COMPLETION_MODEL", DEFAULT_MODEL),
                max_tokens: parse_env("COMPLETION_MAX_TOKENS", 1024)?,
                timeout: Duration::from_secs(parse_env("COMPLETION_TIMEOUT_SECS", 60)?),
            },
            job_search: JobSearchConfig {
                apify_token: require_env("APIFY_TOKEN")?,
                apify_base_url: optional_env("APIFY_BASE_URL", DEFAULT_APIFY_BASE_URL),
                linkedin_actor: optional_env("LINKEDIN_ACTOR_ID", DEFAULT_LINKEDIN_ACTOR),
                naukri_actor: optional_env("NAUKRI_ACTOR_ID", DEFAULT_NAUKRI_ACTOR),
                location: optional_env("JOB_SEARCH_LOCATION", "India"),
                limit: parse_env("JOB_SEARCH_LIMIT", 50)?,
                timeout: Duration::from_secs(parse_env("JOB_SEARCH_TIMEOUT_SECS", 120)?),
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid value, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

//! Job board clients — keyword in, ordered postings out.
//!
//! Each board has its own record type with its own field names; the mapping
//! into the common `JobPosting` shape lives next to the record (see
//! `linkedin.rs` and `naukri.rs`). Boards never share a schema.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod apify;
pub mod linkedin;
pub mod naukri;

/// A single normalized job listing. Fields are absent when the board omits them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub apply_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Linkedin,
    Naukri,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Linkedin => write!(f, "LinkedIn"),
            Provider::Naukri => write!(f, "Naukri"),
        }
    }
}

/// Outright request failure. Zero matches or an unparseable body are not errors.
#[derive(Debug, Error)]
pub enum JobSearchError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("job board request timed out")]
    Timeout,

    #[error("job board returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for JobSearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            JobSearchError::Timeout
        } else {
            JobSearchError::Http(err)
        }
    }
}

#[async_trait]
pub trait JobSearchClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn search(&self, keywords: &str, limit: u32) -> Result<Vec<JobPosting>, JobSearchError>;
}

/// A provider-specific item shape with an explicit mapping into `JobPosting`.
pub trait BoardRecord: DeserializeOwned + Send {
    const PROVIDER: Provider;

    /// Actor input for one keyword search.
    fn search_input(keywords: &str, limit: u32, location: &str) -> serde_json::Value;

    fn into_posting(self) -> JobPosting;
}

/// Parses a response body into postings, keeping the board's order.
///
/// A body that is not a JSON array yields no postings; items that do not fit
/// the record shape are skipped.
pub fn parse_postings<R: BoardRecord>(body: &str, limit: u32) -> Vec<JobPosting> {
    let items = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(_) | Err(_) => {
            debug!("{} response is not a list of postings", R::PROVIDER);
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<R>(item).ok())
        .map(R::into_posting)
        .take(limit as usize)
        .collect()
}

/// Treats empty strings from a board as missing values.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

//! Naukri job scraper records. The apply link lives under `url`.

use serde::Deserialize;
use serde_json::json;

use crate::jobs::{non_empty, BoardRecord, JobPosting, Provider};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaukriJob {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
}

impl BoardRecord for NaukriJob {
    const PROVIDER: Provider = Provider::Naukri;

    // The Naukri actor has no location input.
    fn search_input(keywords: &str, limit: u32, _location: &str) -> serde_json::Value {
        json!({
            "keyword": keywords,
            "maxJobs": limit,
        })
    }

    fn into_posting(self) -> JobPosting {
        JobPosting {
            title: non_empty(self.title),
            company_name: non_empty(self.company_name),
            location: non_empty(self.location),
            apply_url: non_empty(self.url),
        }
    }
}

//! LinkedIn job scraper records. The apply link lives under `link`.

use serde::Deserialize;
use serde_json::json;

use crate::jobs::{non_empty, BoardRecord, JobPosting, Provider};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedinJob {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub link: Option<String>,
}

impl BoardRecord for LinkedinJob {
    const PROVIDER: Provider = Provider::Linkedin;

    fn search_input(keywords: &str, limit: u32, location: &str) -> serde_json::Value {
        json!({
            "title": keywords,
            "location": location,
            "rows": limit,
        })
    }

    fn into_posting(self) -> JobPosting {
        JobPosting {
            title: non_empty(self.title),
            company_name: non_empty(self.company_name),
            location: non_empty(self.location),
            apply_url: non_empty(self.link),
        }
    }
}

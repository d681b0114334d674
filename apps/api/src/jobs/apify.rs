//! Job boards reached through hosted scraper actors on Apify.
//!
//! Each search runs the board's actor synchronously and reads the dataset items
//! straight from the response body.

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::config::JobSearchConfig;
use crate::jobs::linkedin::LinkedinJob;
use crate::jobs::naukri::NaukriJob;
use crate::jobs::{parse_postings, BoardRecord, JobPosting, JobSearchClient, JobSearchError, Provider};

pub const DEFAULT_APIFY_BASE_URL: &str = "https://api.apify.com";
pub const DEFAULT_LINKEDIN_ACTOR: &str = "BHzefUZlZRKWxkTck";
pub const DEFAULT_NAUKRI_ACTOR: &str = "alpcnRV9YI9lYVPWk";

pub type LinkedinBoard = ApifyJobBoard<LinkedinJob>;
pub type NaukriBoard = ApifyJobBoard<NaukriJob>;

/// One board, one actor. `R` fixes the board's item shape and field mapping.
pub struct ApifyJobBoard<R> {
    client: Client,
    base_url: String,
    actor_id: String,
    token: String,
    location: String,
    _record: PhantomData<fn() -> R>,
}

impl<R: BoardRecord> ApifyJobBoard<R> {
    pub fn new(config: &JobSearchConfig, actor_id: &str) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.apify_base_url.trim_end_matches('/').to_string(),
            actor_id: actor_id.to_string(),
            token: config.apify_token.clone(),
            location: config.location.clone(),
            _record: PhantomData,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v2/acts/{}/run-sync-get-dataset-items",
            self.base_url, self.actor_id
        )
    }
}

impl LinkedinBoard {
    pub fn linkedin(config: &JobSearchConfig) -> anyhow::Result<Self> {
        Self::new(config, &config.linkedin_actor)
    }
}

impl NaukriBoard {
    pub fn naukri(config: &JobSearchConfig) -> anyhow::Result<Self> {
        Self::new(config, &config.naukri_actor)
    }
}

#[async_trait]
impl<R: BoardRecord + 'static> JobSearchClient for ApifyJobBoard<R> {
    fn provider(&self) -> Provider {
        R::PROVIDER
    }

    async fn search(&self, keywords: &str, limit: u32) -> Result<Vec<JobPosting>, JobSearchError> {
        info!("Searching {} for '{keywords}' (limit {limit})", R::PROVIDER);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.token)
            .json(&R::search_input(keywords, limit, &self.location))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JobSearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let postings = parse_postings::<R>(&body, limit);
        debug!("{} returned {} posting(s)", R::PROVIDER, postings.len());
        Ok(postings)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn test_config(base_url: &str) -> JobSearchConfig {
        JobSearchConfig {
            apify_token: "apify_test".to_string(),
            apify_base_url: base_url.to_string(),
            linkedin_actor: DEFAULT_LINKEDIN_ACTOR.to_string(),
            naukri_actor: DEFAULT_NAUKRI_ACTOR.to_string(),
            location: "India".to_string(),
            limit: 50,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_each_board_targets_its_own_actor() {
        let config = test_config("https://api.apify.test/");
        let linkedin = LinkedinBoard::linkedin(&config).unwrap();
        let naukri = NaukriBoard::naukri(&config).unwrap();
        assert_eq!(
            linkedin.endpoint(),
            "https://api.apify.test/v2/acts/BHzefUZlZRKWxkTck/run-sync-get-dataset-items"
        );
        assert_eq!(
            naukri.endpoint(),
            "https://api.apify.test/v2/acts/alpcnRV9YI9lYVPWk/run-sync-get-dataset-items"
        );
        assert_eq!(linkedin.provider(), Provider::Linkedin);
        assert_eq!(naukri.provider(), Provider::Naukri);
    }

    #[tokio::test]
    async fn test_unreachable_board_is_a_request_failure() {
        let board = NaukriBoard::naukri(&test_config("http://127.0.0.1:9")).unwrap();
        let result = board.search("Go Developer", 50).await;
        assert!(result.is_err());
    }
}

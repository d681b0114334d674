//! Resume analysis pipeline.
//!
//! Flow per upload: extract text → {summary, skill gaps, roadmap}. The three
//! views are independent and run as concurrent tasks over the same read-only
//! text. On explicit request: summary → keyword completion → normalize → both
//! job boards concurrently.
//!
//! Every stage failure is folded into that stage's `ViewState` / `PanelState`
//! so one failing view or board never takes down its siblings.

use std::sync::Arc;

use tracing::{info, warn};

use crate::analysis::session::{
    AnalysisView, JobPanel, JobRecommendations, PanelState, ViewState,
};
use crate::jobs::JobSearchClient;
use crate::llm_client::prompts::{keyword_prompt, roadmap_prompt, skill_gap_prompt, summary_prompt};
use crate::llm_client::{CompletionClient, CompletionError};

/// Stateless orchestrator. Session bookkeeping lives in `SessionStore`.
pub struct Advisor {
    completion: Arc<dyn CompletionClient>,
    boards: [Arc<dyn JobSearchClient>; 2],
    job_limit: u32,
}

impl Advisor {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        boards: [Arc<dyn JobSearchClient>; 2],
        job_limit: u32,
    ) -> Self {
        Self {
            completion,
            boards,
            job_limit,
        }
    }

    /// Runs one view over the resume text. The completion is returned verbatim.
    pub async fn run_view(&self, view: AnalysisView, resume_text: &str) -> ViewState<String> {
        let prompt = match view {
            AnalysisView::Summary => summary_prompt(resume_text),
            AnalysisView::SkillGaps => skill_gap_prompt(resume_text),
            AnalysisView::Roadmap => roadmap_prompt(resume_text),
        };

        info!("Running {view} stage");
        match self.completion.complete(&prompt).await {
            Ok(content) => ViewState::Ready { content },
            Err(e) => {
                warn!("{view} stage failed: {e}");
                ViewState::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Asks the model for job search keywords and normalizes the answer.
    pub async fn extract_keywords(&self, summary: &str) -> Result<String, CompletionError> {
        let raw = self.completion.complete(&keyword_prompt(summary)).await?;
        Ok(normalize_keywords(&raw))
    }

    /// Queries both boards concurrently with the same keywords.
    pub async fn search_boards(&self, keywords: &str) -> Vec<JobPanel> {
        let [first, second] = &self.boards;
        let (a, b) = tokio::join!(
            search_panel(first.as_ref(), keywords, self.job_limit),
            search_panel(second.as_ref(), keywords, self.job_limit),
        );
        vec![a, b]
    }

    /// Keyword extraction followed by both board searches.
    pub async fn recommend_jobs(&self, summary: &str) -> ViewState<JobRecommendations> {
        info!("Running keyword extraction stage");
        let keywords = match self.extract_keywords(summary).await {
            Ok(k) => k,
            Err(e) => {
                warn!("keyword extraction failed: {e}");
                return ViewState::Failed {
                    error: e.to_string(),
                };
            }
        };

        info!("Searching job boards for '{keywords}'");
        let panels = self.search_boards(&keywords).await;
        ViewState::Ready {
            content: JobRecommendations {
                keywords,
                limit: self.job_limit,
                panels,
            },
        }
    }
}

async fn search_panel(board: &dyn JobSearchClient, keywords: &str, limit: u32) -> JobPanel {
    let provider = board.provider();
    let state = match board.search(keywords, limit).await {
        Ok(postings) if postings.is_empty() => PanelState::NoResults,
        Ok(postings) => PanelState::Postings { postings },
        Err(e) => {
            warn!("{provider} search failed: {e}");
            PanelState::Failed {
                error: e.to_string(),
            }
        }
    };
    JobPanel { provider, state }
}

/// Strips embedded newlines and surrounding whitespace. Idempotent.
pub fn normalize_keywords(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '\n' | '\r'))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::jobs::{JobPosting, JobSearchError, Provider};

    /// Answers every prompt with the same text and records what it was sent.
    struct EchoCompletion {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl EchoCompletion {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionClient for EchoCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    /// Replies by prompt prefix; fails prompts that match nothing.
    struct ScriptedCompletion {
        script: Vec<(&'static str, &'static str)>,
    }

    #[async_trait]
    impl CompletionClient for ScriptedCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.script
                .iter()
                .find(|(prefix, _)| prompt.starts_with(prefix))
                .map(|(_, reply)| reply.to_string())
                .ok_or(CompletionError::Api {
                    status: 503,
                    message: "model overloaded".to_string(),
                })
        }
    }

    enum BoardReply {
        Postings(Vec<JobPosting>),
        Fail,
    }

    struct StubBoard {
        provider: Provider,
        reply: BoardReply,
        calls: Mutex<Vec<(String, u32)>>,
    }

    impl StubBoard {
        fn new(provider: Provider, reply: BoardReply) -> Arc<Self> {
            Arc::new(Self {
                provider,
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl JobSearchClient for StubBoard {
        fn provider(&self) -> Provider {
            self.provider
        }

        async fn search(&self, keywords: &str, limit: u32) -> Result<Vec<JobPosting>, JobSearchError> {
            self.calls.lock().unwrap().push((keywords.to_string(), limit));
            match &self.reply {
                BoardReply::Postings(p) => Ok(p.clone()),
                BoardReply::Fail => Err(JobSearchError::Status {
                    status: 401,
                    body: "invalid token".to_string(),
                }),
            }
        }
    }

    fn posting(title: &str) -> JobPosting {
        JobPosting {
            title: Some(title.to_string()),
            company_name: Some("Acme".to_string()),
            location: Some("Remote".to_string()),
            apply_url: Some(format!("https://jobs.example/{title}")),
        }
    }

    fn advisor(
        completion: Arc<dyn CompletionClient>,
        linkedin: Arc<StubBoard>,
        naukri: Arc<StubBoard>,
    ) -> Advisor {
        Advisor::new(completion, [linkedin, naukri], 50)
    }

    fn empty_boards() -> (Arc<StubBoard>, Arc<StubBoard>) {
        (
            StubBoard::new(Provider::Linkedin, BoardReply::Postings(vec![])),
            StubBoard::new(Provider::Naukri, BoardReply::Postings(vec![])),
        )
    }

    #[test]
    fn test_normalize_strips_newlines_and_trims() {
        assert_eq!(
            normalize_keywords("  Go Developer,\nBackend Engineer\n"),
            "Go Developer,Backend Engineer"
        );
        assert_eq!(normalize_keywords("\r\n\t "), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            "plain",
            "  padded  ",
            "\nleading newline",
            " a\n ",
            "\n \n x \n \n",
            "Go Developer, Backend Engineer, Kubernetes Engineer",
            "multi\nline\r\nkeywords\n\n",
        ];
        for s in samples {
            let once = normalize_keywords(s);
            assert_eq!(normalize_keywords(&once), once, "not idempotent for {s:?}");
            assert!(!once.contains('\n'));
            assert_eq!(once, once.trim());
        }
    }

    #[tokio::test]
    async fn test_summary_is_completion_verbatim() {
        let reply = "  Backend engineer, 5 yrs, Go/K8s\n";
        let (linkedin, naukri) = empty_boards();
        let advisor = advisor(EchoCompletion::new(reply), linkedin, naukri);

        let state = advisor.run_view(AnalysisView::Summary, "resume").await;
        assert_eq!(
            state,
            ViewState::Ready {
                content: reply.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_view_failures_are_isolated() {
        let completion = Arc::new(ScriptedCompletion {
            script: vec![
                ("Summarize this resume", "summary ok"),
                ("Based on this resume, suggest a future roadmap", "roadmap ok"),
            ],
        });
        let (linkedin, naukri) = empty_boards();
        let advisor = advisor(completion, linkedin, naukri);

        let (summary, skill_gaps, roadmap) = tokio::join!(
            advisor.run_view(AnalysisView::Summary, "resume text"),
            advisor.run_view(AnalysisView::SkillGaps, "resume text"),
            advisor.run_view(AnalysisView::Roadmap, "resume text"),
        );
        assert_eq!(summary.content().map(String::as_str), Some("summary ok"));
        assert_eq!(roadmap.content().map(String::as_str), Some("roadmap ok"));
        match skill_gaps {
            ViewState::Failed { error } => assert!(error.contains("503")),
            other => panic!("expected failed skill gaps, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_board_renders_no_results_and_sibling_unaffected() {
        let linkedin = StubBoard::new(Provider::Linkedin, BoardReply::Postings(vec![]));
        let naukri = StubBoard::new(
            Provider::Naukri,
            BoardReply::Postings(vec![posting("SRE"), posting("Go Developer")]),
        );
        let advisor = advisor(EchoCompletion::new("SRE"), linkedin, naukri);

        let panels = advisor.search_boards("SRE").await;
        assert_eq!(panels[0].provider, Provider::Linkedin);
        assert_eq!(panels[0].state, PanelState::NoResults);
        assert_eq!(
            panels[1].state,
            PanelState::Postings {
                postings: vec![posting("SRE"), posting("Go Developer")]
            }
        );
    }

    #[tokio::test]
    async fn test_failing_board_renders_error_and_sibling_still_lists_postings() {
        let linkedin = StubBoard::new(
            Provider::Linkedin,
            BoardReply::Postings(vec![posting("Backend Engineer")]),
        );
        let naukri = StubBoard::new(Provider::Naukri, BoardReply::Fail);
        let advisor = advisor(EchoCompletion::new("Backend"), linkedin, naukri);

        let panels = advisor.search_boards("Backend").await;
        assert_eq!(
            panels[0].state,
            PanelState::Postings {
                postings: vec![posting("Backend Engineer")]
            }
        );
        match &panels[1].state {
            PanelState::Failed { error } => assert!(error.contains("401")),
            other => panic!("expected failed panel, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_keyword_failure_fails_the_jobs_view_without_searching() {
        let completion = Arc::new(ScriptedCompletion { script: vec![] });
        let (linkedin, naukri) = empty_boards();
        let advisor = advisor(completion, linkedin.clone(), naukri.clone());

        let state = advisor.recommend_jobs("summary").await;
        assert!(matches!(state, ViewState::Failed { .. }));
        assert!(linkedin.calls.lock().unwrap().is_empty());
        assert!(naukri.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_resume_to_job_boards() {
        let resume = "Experienced backend engineer, 5 years Go, Kubernetes.";
        let summary = "Backend engineer, 5 yrs, Go/K8s";
        let completion = Arc::new(ScriptedCompletion {
            script: vec![
                ("Summarize this resume", summary),
                (
                    "Based on this resume summary",
                    "\n Go Developer, Backend Engineer, Kubernetes Engineer \n",
                ),
            ],
        });
        let (linkedin, naukri) = empty_boards();
        let advisor = advisor(completion, linkedin.clone(), naukri.clone());

        // The summary prompt carries the resume text.
        assert!(summary_prompt(resume).contains(resume));

        let summary_state = advisor.run_view(AnalysisView::Summary, resume).await;
        let summary_text = summary_state.content().unwrap().clone();
        assert_eq!(summary_text, summary);

        let expected = "Go Developer, Backend Engineer, Kubernetes Engineer";
        let jobs = advisor.recommend_jobs(&summary_text).await;
        let recommendations = jobs.content().unwrap();
        assert_eq!(recommendations.keywords, expected);
        assert_eq!(recommendations.limit, 50);

        for board in [&linkedin, &naukri] {
            assert_eq!(
                *board.calls.lock().unwrap(),
                vec![(expected.to_string(), 50)]
            );
        }
    }

    #[tokio::test]
    async fn test_identical_prompts_are_never_cached() {
        let completion = EchoCompletion::new("same");
        let (linkedin, naukri) = empty_boards();
        let advisor = advisor(completion.clone(), linkedin, naukri);

        advisor.run_view(AnalysisView::Roadmap, "resume").await;
        advisor.run_view(AnalysisView::Roadmap, "resume").await;
        assert_eq!(completion.prompts.lock().unwrap().len(), 2);
    }
}

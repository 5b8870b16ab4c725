//! Ranking Client — asks the external model to order candidate postings for one student.
//!
//! The model is an untrusted oracle: the client only guarantees a well-formed, non-empty
//! list of identifier strings. Matching those strings against real postings is the
//! assembler's job.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm_client::{LlmClient, LlmError};
use crate::models::{JobPosting, Profile};
use crate::recommendation::prompts::{
    rank_jobs_tool, JOB_BLOCK_TEMPLATE, RANKING_PROMPT_TEMPLATE, RANKING_SYSTEM_TEMPLATE,
};

const NOT_SPECIFIED: &str = "Not specified";

/// The axis of relevance requested by the jobs view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusView {
    /// Academic field alignment.
    Studies,
    /// Career-interest alignment.
    #[default]
    Dream,
}

impl FocusView {
    fn basis(&self) -> &'static str {
        match self {
            FocusView::Studies => "academic background",
            FocusView::Dream => "career aspirations",
        }
    }

    fn goal(&self) -> &'static str {
        match self {
            FocusView::Studies => "field of study",
            FocusView::Dream => "career goals",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankingError {
    #[error("Ranking service rate limited")]
    RateLimited,

    #[error("Ranking service quota exhausted")]
    QuotaExhausted,

    #[error("Ranking unavailable: {0}")]
    Unavailable(String),
}

impl From<LlmError> for RankingError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited => RankingError::RateLimited,
            LlmError::QuotaExhausted => RankingError::QuotaExhausted,
            other => RankingError::Unavailable(other.to_string()),
        }
    }
}

/// One ranking call's worth of prompt material. Never persisted.
#[derive(Debug, Clone)]
pub struct RankingRequest {
    pub focus_area: String,
    pub system: String,
    pub prompt: String,
}

impl RankingRequest {
    pub fn build(profile: &Profile, candidates: &[JobPosting], focus_view: FocusView) -> Self {
        let focus_area = match focus_view {
            FocusView::Studies => format!(
                "field of study: {}",
                non_blank(&profile.field_of_study).unwrap_or(NOT_SPECIFIED)
            ),
            FocusView::Dream => format!(
                "career interests and dream role: {}",
                non_blank(&profile.career_interests)
                    .or_else(|| non_blank(&profile.bio))
                    .unwrap_or(NOT_SPECIFIED)
            ),
        };

        let jobs: Vec<String> = candidates.iter().map(render_job_block).collect();

        let prompt = RANKING_PROMPT_TEMPLATE
            .replace("{focus_area}", &focus_area)
            .replace(
                "{bio}",
                non_blank(&profile.bio).unwrap_or("Not provided"),
            )
            .replace("{focus_goal}", focus_view.goal())
            .replace("{jobs}", &jobs.join("\n"));

        Self {
            focus_area,
            system: RANKING_SYSTEM_TEMPLATE.replace("{focus_basis}", focus_view.basis()),
            prompt,
        }
    }
}

fn render_job_block(job: &JobPosting) -> String {
    JOB_BLOCK_TEMPLATE
        .replace("{id}", &job.id.to_string())
        .replace("{title}", &job.title)
        .replace("{company}", &job.employer_name)
        .replace("{employment_type}", job.employment_type.as_str())
        .replace("{description}", &job.description)
        .replace(
            "{requirements}",
            non_blank(&job.requirements).unwrap_or("None specified"),
        )
        .replace(
            "{location}",
            non_blank(&job.location).unwrap_or(NOT_SPECIFIED),
        )
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// The external ranking oracle. Swap backends without touching the assembler.
#[async_trait]
pub trait RankingService: Send + Sync {
    async fn rank(&self, request: &RankingRequest) -> Result<Vec<String>, RankingError>;
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RankedJobIds {
    ranked_job_ids: Vec<String>,
}

/// Ranking through the AI gateway's forced `rank_jobs` function call.
pub struct GatewayRanker(pub LlmClient);

#[async_trait]
impl RankingService for GatewayRanker {
    async fn rank(&self, request: &RankingRequest) -> Result<Vec<String>, RankingError> {
        let ranked: RankedJobIds = self
            .0
            .call_tool(&request.system, &request.prompt, &rank_jobs_tool())
            .await?;
        Ok(ranked.ranked_job_ids)
    }
}

/// Builds ranking requests and bounds each call to the oracle.
#[derive(Clone)]
pub struct RankingClient {
    service: Arc<dyn RankingService>,
    timeout: Duration,
}

impl RankingClient {
    pub fn new(service: Arc<dyn RankingService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Returns posting identifiers, most relevant first.
    /// An empty candidate set yields an empty list without calling the oracle.
    pub async fn rank(
        &self,
        profile: &Profile,
        candidates: &[JobPosting],
        focus_view: FocusView,
    ) -> Result<Vec<String>, RankingError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let request = RankingRequest::build(profile, candidates, focus_view);
        debug!(
            "Ranking {} postings for profile {} by {}",
            candidates.len(),
            profile.id,
            request.focus_area
        );

        let ranked = match tokio::time::timeout(self.timeout, self.service.rank(&request)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Ranking call timed out after {}ms", self.timeout.as_millis());
                return Err(RankingError::Unavailable("ranking call timed out".to_string()));
            }
        };

        if ranked.is_empty() {
            return Err(RankingError::Unavailable(
                "ranker returned no identifiers".to_string(),
            ));
        }

        Ok(ranked)
    }
}

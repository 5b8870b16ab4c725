//! Recommendation Assembler — profile → active postings → ranking → reconciled order.
//!
//! The result is always a permutation of the active postings. Ranking failures degrade to
//! newest-first order; only a missing profile is an error.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::JobPosting;
use crate::recommendation::ranking::{FocusView, RankingClient, RankingError};
use crate::store::{JobStore, StoreError};

/// How the returned order was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingStatus {
    Ranked,
    /// No active postings; nothing was sent to the ranker.
    NoPostings,
    /// Profile has nothing to rank against; newest-first order.
    InsufficientSignal,
    RateLimited,
    QuotaExhausted,
    Unavailable,
}

impl From<&RankingError> for RankingStatus {
    fn from(err: &RankingError) -> Self {
        match err {
            RankingError::RateLimited => RankingStatus::RateLimited,
            RankingError::QuotaExhausted => RankingStatus::QuotaExhausted,
            RankingError::Unavailable(_) => RankingStatus::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub postings: Vec<JobPosting>,
    pub ranking: RankingStatus,
}

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Profile {0} not found")]
    ProfileNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RecommendError> for AppError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::ProfileNotFound(id) => {
                AppError::NotFound(format!("Profile {id} not found"))
            }
            RecommendError::Store(e) => AppError::Store(e),
        }
    }
}

/// Request-scoped assembler; holds only injected handles.
pub struct Recommender {
    store: Arc<dyn JobStore>,
    ranker: RankingClient,
}

impl Recommender {
    pub fn new(store: Arc<dyn JobStore>, ranker: RankingClient) -> Self {
        Self { store, ranker }
    }

    pub async fn recommend(
        &self,
        student_id: Uuid,
        focus_view: FocusView,
    ) -> Result<Recommendations, RecommendError> {
        let profile = self
            .store
            .get_profile(student_id)
            .await?
            .ok_or(RecommendError::ProfileNotFound(student_id))?;

        // Newest-first baseline.
        let candidates = self.store.list_active_postings(None).await?;

        if candidates.is_empty() {
            return Ok(Recommendations {
                postings: candidates,
                ranking: RankingStatus::NoPostings,
            });
        }

        if !profile.has_ranking_signal() {
            info!("Profile {student_id} has no ranking signal, returning newest-first");
            return Ok(Recommendations {
                postings: candidates,
                ranking: RankingStatus::InsufficientSignal,
            });
        }

        match self.ranker.rank(&profile, &candidates, focus_view).await {
            Ok(ranked_ids) => {
                let (postings, matched) = reconcile(candidates, &ranked_ids);
                // Nothing usable came back, so the order is still the baseline.
                let ranking = if matched == 0 {
                    warn!("No ranked id matched a candidate for profile {student_id}");
                    RankingStatus::Unavailable
                } else {
                    RankingStatus::Ranked
                };
                Ok(Recommendations { postings, ranking })
            }
            Err(e) => {
                warn!("Ranking failed for profile {student_id}, falling back to newest-first: {e}");
                Ok(Recommendations {
                    postings: candidates,
                    ranking: RankingStatus::from(&e),
                })
            }
        }
    }
}

/// Reorders `candidates` by `ranked_ids`.
///
/// Unknown, unparsable and repeated ids are dropped. Candidates the ranker left out follow
/// in their original order. The output is a permutation of `candidates`; the count is how
/// many ranked ids matched a candidate.
pub fn reconcile(candidates: Vec<JobPosting>, ranked_ids: &[String]) -> (Vec<JobPosting>, usize) {
    let positions: HashMap<Uuid, usize> = candidates
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id, i))
        .collect();

    let mut seen = HashSet::new();
    let mut order: Vec<usize> = ranked_ids
        .iter()
        .filter_map(|raw| Uuid::parse_str(raw.trim()).ok())
        .filter_map(|id| positions.get(&id).copied())
        .filter(|i| seen.insert(*i))
        .collect();

    let matched = order.len();
    let dropped = ranked_ids.len() - matched;
    if dropped > 0 {
        warn!("Discarded {dropped} ranked ids that did not match a candidate");
    }

    order.extend((0..candidates.len()).filter(|i| !seen.contains(i)));

    let mut slots: Vec<Option<JobPosting>> = candidates.into_iter().map(Some).collect();
    let postings = order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();
    (postings, matched)
}

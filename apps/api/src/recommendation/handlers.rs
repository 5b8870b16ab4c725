//! Axum route handler for the Recommendation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::JobPosting;
use crate::recommendation::assembler::{RankingStatus, Recommender};
use crate::recommendation::ranking::FocusView;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub view_type: FocusView,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<JobPosting>,
    pub ranking: RankingStatus,
}

/// POST /api/v1/recommendations
///
/// Active postings ordered for the student. Degrades to newest-first when ranking is
/// unavailable; `ranking` tells the client which happened.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    let recommender = Recommender::new(state.store.clone(), state.ranker.clone());
    let result = recommender
        .recommend(request.user_id, request.view_type)
        .await?;

    Ok(Json(RecommendResponse {
        recommendations: result.postings,
        ranking: result.ranking,
    }))
}

use std::sync::Arc;

use crate::config::Config;
use crate::notifications::DeliveryService;
use crate::recommendation::RankingClient;
use crate::store::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Handlers build request-scoped `Recommender`s and job-scoped `NotificationSweeper`s from it.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub ranker: RankingClient,
    pub delivery: Arc<dyn DeliveryService>,
    pub config: Config,
}

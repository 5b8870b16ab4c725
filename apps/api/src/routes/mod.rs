pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::notifications::handlers::handle_sweep;
use crate::recommendation::handlers::handle_recommend;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/recommendations", post(handle_recommend))
        .route("/api/v1/notifications/sweep", post(handle_sweep))
        .with_state(state)
}

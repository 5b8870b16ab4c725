mod config;
mod errors;
mod llm_client;
mod models;
mod notifications;
mod recommendation;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::notifications::ResendDelivery;
use crate::recommendation::{GatewayRanker, RankingClient};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job board API v{}", env!("CARGO_PKG_VERSION"));

    let store = PgStore::connect(&config.database_url).await?;

    // Ranking goes through the AI gateway; the client timeout backs up the ranking timeout
    let llm = LlmClient::new(config.ai_gateway_api_key.clone(), config.ranking_timeout)?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let ranker = RankingClient::new(Arc::new(GatewayRanker(llm)), config.ranking_timeout);

    let delivery = ResendDelivery::new(
        config.resend_api_key.clone(),
        config.notify_from.clone(),
        config.delivery_timeout,
    )?;
    info!("Email delivery initialized (from: {})", config.notify_from);

    let state = AppState {
        store: Arc::new(store),
        ranker,
        delivery: Arc::new(delivery),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to APP_BASE_URL once the SPA is served from one host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

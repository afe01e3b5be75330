mod assessment;
mod config;
mod delivery;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod pipeline;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::client::AssessmentClient;
use crate::config::Config;
use crate::delivery::DeliveryForwarder;
use crate::models::role::RoleCatalog;
use crate::pipeline::AnalysisPipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Initialize assessment client (falls back to heuristic mode without a credential)
    let assessor = AssessmentClient::from_config(&config.reasoning, config.scoring)?;
    if assessor.is_live() {
        info!(
            "Assessment client initialized (model: {})",
            llm_client::MODEL
        );
    } else {
        warn!("Assessment client running in heuristic-only mode");
    }
    info!("Scoring policy: {:?}", config.scoring);

    // Initialize delivery forwarder
    let forwarder = DeliveryForwarder::from_config(&config.delivery);
    match (&config.delivery.endpoint, config.delivery.enabled) {
        (Some(endpoint), true) => info!("Delivery enabled: {endpoint}"),
        _ => info!("Delivery disabled"),
    }

    let state = AppState {
        pipeline: Arc::new(AnalysisPipeline::new(assessor, forwarder)),
        roles: Arc::new(RoleCatalog::default()),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

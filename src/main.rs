// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::waterfall_service::WaterfallService;
use crate::infrastructure::config::{load_card_config, load_homeassistant_config};
use crate::infrastructure::home_assistant_repository::HomeAssistantRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_waterfall, health_check, more_info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration; an invalid card stops startup here
    let ha_config = load_homeassistant_config().context("Failed to load Home Assistant config")?;
    let card = load_card_config().context("Invalid waterfall card config")?;
    tracing::info!("Loaded card with {} entities", card.entities.len());

    // Create repository (infrastructure layer)
    let repository = Arc::new(HomeAssistantRepository::new(
        ha_config.homeassistant.host,
        ha_config.homeassistant.token,
        ha_config.homeassistant.language,
    ));

    // Create service (application layer)
    let waterfall_service = WaterfallService::new(repository.clone(), repository, card);

    // Create application state
    let state = Arc::new(AppState::new(waterfall_service));

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/waterfall", get(get_waterfall))
        .route("/entities/:entity_id/more-info", post(more_info))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = ha_config
        .homeassistant
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address {}", ha_config.homeassistant.listen))?;
    tracing::info!("Starting waterfall-history service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

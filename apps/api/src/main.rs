mod clients;
mod config;
mod errors;
mod export;
mod ingest;
mod insights;
mod llm_client;
mod report;
mod reports;
mod routes;
mod state;
mod story;
mod webhook;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clients::ClientRegistry;
use crate::config::Config;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::routes::build_router;
use crate::state::AppState;
use crate::webhook::WebhookClient;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PilotPulse API v{}", env!("CARGO_PKG_VERSION"));

    // Client profiles: built-ins, then optional overrides from disk
    let mut clients = ClientRegistry::builtin();
    if let Some(path) = &config.clients_config_path {
        clients
            .load_overrides(path)
            .with_context(|| format!("loading client profiles from {}", path.display()))?;
    }
    for profile in clients.list() {
        info!(
            "Client '{}' ({}), webhook configured: {}",
            profile.id,
            profile.name,
            config.webhook_url(&profile.id).is_some()
        );
    }

    // LLM client only when a key is present; its endpoints report the gap otherwise
    let llm: Option<Arc<dyn TextGenerator>> = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone(), config.anthropic_api_url.clone())?;
            info!("LLM client initialized ({})", config.anthropic_api_url);
            Some(Arc::new(client))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; insights and success stories are disabled");
            None
        }
    };

    let webhook = WebhookClient::new()?;

    let state = AppState {
        config: config.clone(),
        clients: Arc::new(clients),
        llm,
        webhook,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

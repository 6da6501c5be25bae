use std::sync::Arc;

use crate::clients::ClientRegistry;
use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::webhook::WebhookClient;

pub const MISSING_API_KEY: &str = "ANTHROPIC_API_KEY not configured";

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub clients: Arc<ClientRegistry>,
    /// `None` when no API key is configured; LLM endpoints then answer with a
    /// configuration error without touching the network.
    pub llm: Option<Arc<dyn TextGenerator>>,
    pub webhook: WebhookClient,
}

impl AppState {
    pub fn require_llm(&self) -> Result<Arc<dyn TextGenerator>, AppError> {
        self.llm
            .clone()
            .ok_or_else(|| AppError::Configuration(MISSING_API_KEY.to_string()))
    }
}

use axum::{extract::State, Json};
use serde::Serialize;

use crate::clients::{Benchmarks, ClientProfile};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClientSummary {
    pub id: String,
    pub name: String,
    pub industry: String,
    pub webhook_configured: bool,
    pub default_insights_instructions: String,
    pub default_story_instructions: String,
    pub default_benchmarks: Benchmarks,
}

impl ClientSummary {
    fn from_profile(profile: &ClientProfile, webhook_configured: bool) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            industry: profile.industry.clone(),
            webhook_configured,
            default_insights_instructions: profile.insights.default_instructions.clone(),
            default_story_instructions: profile.success_story.default_instructions.clone(),
            default_benchmarks: profile.success_story.default_benchmarks,
        }
    }
}

/// GET /api/v1/clients
pub async fn handle_list_clients(State(state): State<AppState>) -> Json<Vec<ClientSummary>> {
    let clients = state
        .clients
        .list()
        .iter()
        .map(|p| ClientSummary::from_profile(p, state.config.webhook_url(&p.id).is_some()))
        .collect();
    Json(clients)
}

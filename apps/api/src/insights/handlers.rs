use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::insights::{generate_insights, Insight, InsightsRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: Vec<Insight>,
}

/// POST /api/v1/insights
pub async fn handle_insights(
    State(state): State<AppState>,
    Json(request): Json<InsightsRequest>,
) -> Result<Json<InsightsResponse>, AppError> {
    let llm = state.require_llm()?;
    let client = state.clients.resolve(&request.client_id);
    let insights = generate_insights(llm.as_ref(), client, &request).await?;
    Ok(Json(InsightsResponse { insights }))
}

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::state::AppState;
use crate::story::{generate_story, StoryRequest, SuccessStory};

#[derive(Debug, Serialize)]
pub struct StoryResponse {
    pub story: Option<SuccessStory>,
    pub plain_text: Option<String>,
}

/// POST /api/v1/success-story
pub async fn handle_success_story(
    State(state): State<AppState>,
    Json(request): Json<StoryRequest>,
) -> Result<Json<StoryResponse>, AppError> {
    let llm = state.require_llm()?;
    let client = state.clients.resolve(&request.client_id);
    let story = generate_story(llm.as_ref(), client, &request).await?;
    let plain_text = story.as_ref().map(SuccessStory::to_plain_text);
    Ok(Json(StoryResponse { story, plain_text }))
}

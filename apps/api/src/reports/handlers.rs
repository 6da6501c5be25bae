use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::reports::{generate_report, GenerateReportRequest, GenerateReportResponse};
use crate::state::AppState;

/// POST /api/v1/reports
pub async fn handle_generate_report(
    State(state): State<AppState>,
    Json(request): Json<GenerateReportRequest>,
) -> Result<Json<GenerateReportResponse>, AppError> {
    let response = generate_report(&state, request).await?;
    Ok(Json(response))
}

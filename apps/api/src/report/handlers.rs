use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::report::view::{build_report_view, ReportView};
use crate::report::ReportAggregate;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportViewRequest {
    pub client_id: String,
    pub report: ReportAggregate,
}

/// POST /api/v1/reports/view
///
/// Re-renders the presentation model for an aggregate the browser already
/// holds, e.g. after switching the client selector.
pub async fn handle_report_view(
    State(state): State<AppState>,
    Json(request): Json<ReportViewRequest>,
) -> Result<Json<ReportView>, AppError> {
    if request.report.empty {
        return Err(AppError::Validation(
            "Report is empty; nothing to render".to_string(),
        ));
    }
    let client = state.clients.resolve(&request.client_id);
    Ok(Json(build_report_view(&request.report, client)))
}

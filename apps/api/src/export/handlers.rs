use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::export::{export_file_name, render_report_pdf};
use crate::insights::Insight;
use crate::report::ReportAggregate;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub client_id: String,
    pub report: ReportAggregate,
    #[serde(default)]
    pub insights: Option<Vec<Insight>>,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// POST /api/v1/reports/export
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let client = state.clients.resolve(&request.client_id).clone();
    let file_name = export_file_name(&client.id, &request.report, request.file_name.as_deref());
    let generated_at = Local::now().naive_local();

    let bytes = tokio::task::spawn_blocking(move || {
        render_report_pdf(
            &request.report,
            &client,
            request.insights.as_deref(),
            generated_at,
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF export: {e}")))??;

    info!("Exported {file_name} ({} bytes)", bytes.len());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::state::test_support::state_without_llm;

    #[tokio::test]
    async fn test_export_returns_pdf_attachment() {
        let report: ReportAggregate = serde_json::from_value(serde_json::json!({
            "period": {"start": "2025-03-01", "end": "2025-03-31"},
            "kpis": {"total_unique_conversations": 10}
        }))
        .unwrap();
        let response = handle_export_pdf(
            State(state_without_llm()),
            Json(ExportRequest {
                client_id: "henderson".to_string(),
                report,
                insights: None,
                file_name: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"henderson-report-2025-03-01-to-2025-03-31.pdf\""
        );
    }

    #[tokio::test]
    async fn test_export_of_empty_report_is_bad_request() {
        let err = handle_export_pdf(
            State(state_without_llm()),
            Json(ExportRequest {
                client_id: "henderson".to_string(),
                report: ReportAggregate {
                    empty: true,
                    ..Default::default()
                },
                insights: None,
                file_name: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}

//! Report generation flow: rows → analytics webhook → presentation view,
//! followed by AI observations when the aggregate has something to say.

pub mod handlers;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::ingest::SheetRow;
use crate::insights::{generate_insights, Insight, InsightsRequest};
use crate::report::view::{build_report_view, default_date_range, ReportView, EMPTY_REPORT_MESSAGE};
use crate::report::ReportAggregate;
use crate::state::AppState;
use crate::webhook::ReportRequest;

const DATE_FORMAT: &str = "%Y-%m-%d";
pub const NO_ROWS_MESSAGE: &str = "Please upload at least one Excel file first.";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenerateReportRequest {
    pub client_id: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub rows: Vec<SheetRow>,
    /// Absent means the client's default insights instructions; `""` sends none.
    pub custom_instructions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub report: ReportAggregate,
    pub view: Option<ReportView>,
    pub insights: Option<Vec<Insight>>,
    pub insights_error: Option<String>,
}

/// Resolves the requested range, defaulting either end to the current month.
pub fn resolve_date_range(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    let (default_start, default_end) = default_date_range(today);
    let start = parse_date(start, "start_date")?.unwrap_or(default_start);
    let end = parse_date(end, "end_date")?.unwrap_or(default_end);
    if start > end {
        return Err(AppError::Validation(
            "start_date must not be after end_date".to_string(),
        ));
    }
    Ok((start, end))
}

fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, DATE_FORMAT)
            .map(Some)
            .map_err(|_| AppError::Validation(format!("{field} must be YYYY-MM-DD, got '{v}'"))),
    }
}

pub async fn generate_report(
    state: &AppState,
    request: GenerateReportRequest,
) -> Result<GenerateReportResponse, AppError> {
    if request.rows.is_empty() {
        return Err(AppError::Validation(NO_ROWS_MESSAGE.to_string()));
    }

    let client = state.clients.resolve(&request.client_id);
    let url = state.config.webhook_url(&client.id).ok_or_else(|| {
        AppError::Configuration(format!("Webhook URL not configured for {}", client.name))
    })?;

    let (start, end) = resolve_date_range(
        request.start_date.as_deref(),
        request.end_date.as_deref(),
        Local::now().date_naive(),
    )?;
    let start_date = start.format(DATE_FORMAT).to_string();
    let end_date = end.format(DATE_FORMAT).to_string();

    let mut report = state
        .webhook
        .generate(
            url,
            &ReportRequest {
                client_id: &client.id,
                start_date: &start_date,
                end_date: &end_date,
                rows: &request.rows,
            },
        )
        .await?;

    if report.empty {
        info!("Webhook returned an empty report for '{}'", client.id);
        report
            .message
            .get_or_insert_with(|| EMPTY_REPORT_MESSAGE.to_string());
        return Ok(GenerateReportResponse {
            report,
            view: None,
            insights: None,
            insights_error: None,
        });
    }

    let view = build_report_view(&report, client);

    // Observations only once the aggregate exists; a failure here never fails
    // the report itself.
    let (insights, insights_error) = if report.trends.is_empty() {
        (None, None)
    } else {
        let instructions = request
            .custom_instructions
            .unwrap_or_else(|| client.insights.default_instructions.clone());
        let insights_request =
            InsightsRequest::from_report(&client.id, Some(instructions), &report);
        let outcome = match state.require_llm() {
            Ok(llm) => generate_insights(llm.as_ref(), client, &insights_request).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(insights) => (Some(insights), None),
            Err(e) => {
                warn!("Insights failed for '{}': {e}", client.id);
                (None, Some(e.client_message()))
            }
        }
    };

    Ok(GenerateReportResponse {
        report,
        view: Some(view),
        insights,
        insights_error,
    })
}

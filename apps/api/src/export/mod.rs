//! PDF export of a generated report.
//!
//! Pipeline: `ReportView` → [`document::build_document`] (styled blocks) →
//! [`paginate::paginate`] (wrapped rows on A4 pages) → [`pdf::render_pages`].
//! Layout is CPU-bound, so the handler runs it inside `spawn_blocking`.

pub mod document;
pub mod font_metrics;
pub mod handlers;
pub mod paginate;
pub mod pdf;

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::debug;

use crate::clients::ClientProfile;
use crate::insights::Insight;
use crate::report::view::build_report_view;
use crate::report::ReportAggregate;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Report is empty; nothing to export")]
    EmptyReport,

    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}

pub fn footer_text(generated_at: NaiveDateTime) -> String {
    format!(
        "Report generated on {} | PilotPulse.ai | Confidential",
        generated_at.format("%-d %b %Y, %H:%M")
    )
}

/// `<client>-report-<start>-to-<end>.pdf`, or a cleaned-up caller-supplied name.
pub fn export_file_name(client_id: &str, report: &ReportAggregate, requested: Option<&str>) -> String {
    if let Some(name) = requested.map(sanitize_file_name).filter(|n| !n.is_empty()) {
        return if name.to_lowercase().ends_with(".pdf") {
            name
        } else {
            format!("{name}.pdf")
        };
    }
    sanitize_file_name(&format!(
        "{client_id}-report-{}-to-{}.pdf",
        report.period.start, report.period.end
    ))
}

fn sanitize_file_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn render_report_pdf(
    report: &ReportAggregate,
    client: &ClientProfile,
    insights: Option<&[Insight]>,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>, ExportError> {
    if report.empty {
        return Err(ExportError::EmptyReport);
    }

    let view = build_report_view(report, client);
    let blocks = document::build_document(&view, insights);
    let config = paginate::A4;
    let pages = paginate::paginate(&blocks, &config);
    debug!(
        "Export for '{}': {} blocks on {} page(s), last page {:.0}% full",
        client.id,
        blocks.len(),
        pages.len(),
        pages
            .last()
            .map(|p| p.fill_fraction(&config) * 100.0)
            .unwrap_or_default()
    );

    pdf::render_pages(&view.report_title, &pages, &config, &footer_text(generated_at))
}

//! Client for the external analytics webhook.
//!
//! Deduplication, KPI, funnel and trend computation all happen behind this
//! call. The service only forwards rows and trusts the aggregate it gets back.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::ingest::SheetRow;
use crate::report::models::fill_missing_dropoffs;
use crate::report::ReportAggregate;

const HTTP_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx from the webhook. `body` is the raw response text.
    #[error("Webhook returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Payload the webhook expects.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest<'a> {
    pub client_id: &'a str,
    pub start_date: &'a str,
    pub end_date: &'a str,
    pub rows: &'a [SheetRow],
}

#[derive(Clone)]
pub struct WebhookClient {
    client: Client,
}

impl WebhookClient {
    pub fn new() -> Result<Self, WebhookError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()?,
        })
    }

    /// Posts the rows and returns the aggregate. Single attempt.
    pub async fn generate(
        &self,
        url: &str,
        request: &ReportRequest<'_>,
    ) -> Result<ReportAggregate, WebhookError> {
        info!(
            "Posting {} rows to webhook for client '{}' ({} to {})",
            request.rows.len(),
            request.client_id,
            request.start_date,
            request.end_date
        );

        let response = self.client.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Webhook returned {}: {}", status, body);
            return Err(WebhookError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut report: ReportAggregate = response.json().await?;
        fill_missing_dropoffs(&mut report.funnel);
        if !report.empty && !report.dedup_summary.is_consistent() {
            warn!(
                "Webhook dedup summary is inconsistent: {:?}",
                report.dedup_summary
            );
        }
        Ok(report)
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::ExportError;
use crate::ingest::IngestError;
use crate::llm_client::LlmError;
use crate::webhook::WebhookError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing API key or webhook URL. The message is fixed and safe to show.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-2xx from the webhook or the LLM API. `details` is the raw body text.
    #[error("Upstream error: {message}")]
    Upstream { message: String, details: String },

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_)
            | AppError::Llm(_)
            | AppError::Export(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message a client may see, as used in the response body.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Configuration(msg)
            | AppError::Llm(msg)
            | AppError::Export(msg) => msg.clone(),
            AppError::Upstream { message, .. } => message.clone(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message, details) = match self {
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg, None),
            AppError::Configuration(msg) => {
                tracing::warn!("Configuration error: {msg}");
                ("CONFIGURATION_ERROR", msg, None)
            }
            AppError::Upstream { message, details } => {
                tracing::error!("Upstream error: {message}: {details}");
                ("UPSTREAM_ERROR", message, Some(details))
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                ("LLM_ERROR", msg, None)
            }
            AppError::Export(msg) => {
                tracing::error!("Export error: {msg}");
                ("EXPORT_ERROR", msg, None)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = json!(details);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Api { status, body } => AppError::Upstream {
                message: format!("Anthropic API error: {status}"),
                details: body,
            },
            other => AppError::Llm(other.to_string()),
        }
    }
}

impl From<WebhookError> for AppError {
    fn from(e: WebhookError) -> Self {
        match e {
            WebhookError::Status { status, body } => AppError::Upstream {
                message: format!("Webhook returned {status}"),
                details: body,
            },
            other => AppError::Upstream {
                message: "Webhook request failed".to_string(),
                details: other.to_string(),
            },
        }
    }
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        AppError::Validation(format!("Failed to parse Excel file: {e}"))
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::EmptyReport => AppError::Validation(e.to_string()),
            other => AppError::Export(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_api_error_maps_to_bad_gateway() {
        let err: AppError = LlmError::Api {
            status: 529,
            body: "overloaded".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        match err {
            AppError::Upstream { message, details } => {
                assert_eq!(message, "Anthropic API error: 529");
                assert_eq!(details, "overloaded");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_client_message_hides_internal_details() {
        let err = AppError::Internal(anyhow::anyhow!("db password wrong"));
        assert_eq!(err.client_message(), "An internal server error occurred");
        let err: AppError = WebhookError::Status {
            status: 503,
            body: "paused".to_string(),
        }
        .into();
        assert_eq!(err.client_message(), "Webhook returned 503");
    }

    #[test]
    fn test_configuration_error_is_500() {
        let err = AppError::Configuration("ANTHROPIC_API_KEY not configured".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

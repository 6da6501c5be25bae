pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{clients, export, ingest, insights, report, reports, story};

pub fn build_router(state: AppState) -> Router {
    // Uploaded workbooks and the rows parsed from them both exceed axum's
    // 2 MB default.
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/clients",
            get(clients::handlers::handle_list_clients),
        )
        .route("/api/v1/uploads", post(ingest::handlers::handle_upload))
        // Reports
        .route(
            "/api/v1/reports",
            post(reports::handlers::handle_generate_report),
        )
        .route(
            "/api/v1/reports/view",
            post(report::handlers::handle_report_view),
        )
        .route(
            "/api/v1/reports/export",
            post(export::handlers::handle_export_pdf),
        )
        // LLM-backed
        .route("/api/v1/insights", post(insights::handlers::handle_insights))
        .route(
            "/api/v1/success-story",
            post(story::handlers::handle_success_story),
        )
        .layer(body_limit)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use std::sync::Arc;

    use super::*;
    use crate::state::test_support::{state_with_llm, state_without_llm, CannedGenerator};

    const BOUNDARY: &str = "pilotpulse-test-boundary";

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match file_name {
                Some(f) => format!("form-data; name=\"{name}\"; filename=\"{f}\""),
                None => format!("form-data; name=\"{name}\""),
            };
            body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n\r\n").as_bytes());
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/uploads")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state_without_llm());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "pilotpulse-api");
    }

    #[tokio::test]
    async fn test_list_clients() {
        let app = build_router(state_without_llm());
        let response = app
            .oneshot(Request::get("/api/v1/clients").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["henderson", "call_lade"]);
    }

    #[tokio::test]
    async fn test_llm_endpoints_without_key_return_500() {
        for uri in ["/api/v1/insights", "/api/v1/success-story"] {
            let app = build_router(state_without_llm());
            let response = app
                .oneshot(post_json(uri, json!({"client_id": "henderson"})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            let body = json_body(response).await;
            assert_eq!(body["error"]["message"], "ANTHROPIC_API_KEY not configured");
        }
    }

    #[tokio::test]
    async fn test_report_without_rows_is_rejected() {
        let app = build_router(state_without_llm());
        let response = app
            .oneshot(post_json(
                "/api/v1/reports",
                json!({"client_id": "henderson", "rows": []}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(
            body["error"]["message"],
            "Please upload at least one Excel file first."
        );
    }

    #[tokio::test]
    async fn test_upload_without_files_is_rejected() {
        let app = build_router(state_without_llm());
        let response = app
            .oneshot(multipart(&[("note", None, b"hello".as_slice())]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_of_corrupt_workbook_is_rejected() {
        let app = build_router(state_without_llm());
        let response = app
            .oneshot(multipart(&[(
                "files",
                Some("march.xlsx"),
                b"this is not a spreadsheet".as_slice(),
            )]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("Failed to parse Excel file: march.xlsx"));
    }

    #[tokio::test]
    async fn test_view_of_empty_report_is_rejected() {
        let app = build_router(state_without_llm());
        let response = app
            .oneshot(post_json(
                "/api/v1/reports/view",
                json!({"client_id": "henderson", "report": {"empty": true}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_row_payload_over_two_megabytes_is_accepted() {
        let notes = "x".repeat(3 * 1024 * 1024);
        let app = build_router(state_without_llm());
        let response = app
            .oneshot(post_json(
                "/api/v1/reports",
                json!({"client_id": "henderson", "rows": [{"Notes": notes}]}),
            ))
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(response).await;
        assert_eq!(
            body["error"]["message"],
            "Webhook URL not configured for Henderson Security"
        );
    }

    #[tokio::test]
    async fn test_body_over_configured_limit_is_rejected() {
        let mut state = state_without_llm();
        state.config.max_upload_bytes = 1024;
        let app = build_router(state);
        let response = app
            .oneshot(post_json(
                "/api/v1/reports",
                json!({"client_id": "henderson", "rows": [{"Notes": "x".repeat(4096)}]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_story_accepts_cleared_benchmark_field() {
        let llm = Arc::new(CannedGenerator::new("no story today"));
        let app = build_router(state_with_llm(llm.clone()));
        let response = app
            .oneshot(post_json(
                "/api/v1/success-story",
                json!({
                    "client_id": "henderson",
                    "benchmarks": {
                        "costPerRecruiterHour": 25,
                        "manualScreeningMinutes": null,
                        "recruiterHoursPerDay": 8,
                        "monthlyRecruiterSalary": 3500
                    }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["story"].is_null());
        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("\"roiSection\": null"));
    }
}

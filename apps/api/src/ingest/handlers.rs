use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::ingest::{parse_workbooks, SheetRow};
use crate::state::AppState;

const FILES_FIELD: &str = "files";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_names: Vec<String>,
    pub row_count: usize,
    pub rows: Vec<SheetRow>,
}

/// POST /api/v1/uploads
pub async fn handle_upload(
    State(_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or("upload.xlsx").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
        files.push((name, bytes.to_vec()));
    }

    if files.is_empty() {
        return Err(AppError::Validation("No files uploaded".to_string()));
    }

    let file_names: Vec<String> = files.iter().map(|(name, _)| name.clone()).collect();

    // Workbook decoding is CPU-bound.
    let rows = tokio::task::spawn_blocking(move || parse_workbooks(files))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed parsing uploads: {e}")))??;

    info!("Parsed {} rows from {} file(s)", rows.len(), file_names.len());
    Ok(Json(UploadResponse {
        file_names,
        row_count: rows.len(),
        rows,
    }))
}

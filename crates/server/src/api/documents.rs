//! Document upload endpoint.

use std::sync::Arc;

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use loanport_core::ingest::{DocumentCategory, UploadTask};
use loanport_core::storage::DocumentFile;

use super::error::ApiError;
use crate::metrics::SUBMISSIONS_REFUSED_TOTAL;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadedDocument {
    pub category: DocumentCategory,
    pub file_name: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitDocumentsResponse {
    pub batch_id: Uuid,
    pub documents: Vec<UploadedDocument>,
    pub categories: Vec<DocumentCategory>,
}

/// `POST /borrowers/{id}/documents`
///
/// Multipart form. Each `file` part belongs to the most recent `category`
/// part; an `access_code` part applies to the file just before it.
pub async fn submit_documents(
    State(state): State<Arc<AppState>>,
    Path(borrower_id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitDocumentsResponse>), ApiError> {
    let tasks = read_tasks(multipart).await?;
    if tasks.is_empty() {
        return Err(ApiError::bad_request("No documents attached"));
    }

    let Some(_permit) = state.submissions().try_acquire(&borrower_id) else {
        SUBMISSIONS_REFUSED_TOTAL.inc();
        warn!(borrower_id = %borrower_id, "Submission refused, another is in progress");
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            "A document upload is already in progress",
        ));
    };

    let receipt = state.ingestion().ingest(&borrower_id, tasks).await?;
    info!(
        borrower_id = %borrower_id,
        batch_id = %receipt.batch_id,
        documents = receipt.uploads.len(),
        "Documents submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitDocumentsResponse {
            batch_id: receipt.batch_id,
            documents: receipt
                .uploads
                .into_iter()
                .map(|u| UploadedDocument {
                    category: u.category,
                    file_name: u.original_file_name,
                    url: u.url,
                })
                .collect(),
            categories: receipt
                .acknowledgements
                .into_iter()
                .map(|(category, _)| category)
                .collect(),
        }),
    ))
}

async fn read_tasks(mut multipart: Multipart) -> Result<Vec<UploadTask>, ApiError> {
    let mut tasks: Vec<UploadTask> = Vec::new();
    let mut category: Option<DocumentCategory> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(ApiError::bad_request(format!("Invalid form data: {}", e))),
        };

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "category" => {
                let text = read_text(field).await?;
                category = Some(text.parse().map_err(ApiError::bad_request)?);
            }
            "file" => {
                let category = category
                    .ok_or_else(|| ApiError::bad_request("A file was sent before its category"))?;
                let file_name = field.file_name().unwrap_or("document").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read {}: {}", file_name, e))
                })?;
                tasks.push(UploadTask::new(
                    DocumentFile::new(file_name, content_type, bytes.to_vec()),
                    category,
                ));
            }
            "access_code" => {
                let code = read_text(field).await?;
                let task = tasks
                    .pop()
                    .ok_or_else(|| ApiError::bad_request("An access code was sent before its file"))?;
                tasks.push(task.with_access_code(code));
            }
            _ => {}
        }
    }

    Ok(tasks)
}

async fn read_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map(|t| t.trim().to_string())
        .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e)))
}

//! Error responses shared by the API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use loanport_core::{BackendError, IngestError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// A failed request: status plus the single message shown to the borrower.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Backend statuses pass through; a transport or decode failure is a 502.
fn backend_status(error: &BackendError) -> StatusCode {
    error
        .status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

impl From<BackendError> for ApiError {
    fn from(error: BackendError) -> Self {
        let status = backend_status(&error);
        if status.is_server_error() {
            error!(error = %error, "Backend request failed");
        }
        Self::new(status, error.to_string())
    }
}

impl From<IngestError> for ApiError {
    fn from(error: IngestError) -> Self {
        let message = error.user_message();
        match error {
            IngestError::Validation(_) => Self::bad_request(message),
            IngestError::Credentials(_) | IngestError::Upload { .. } => {
                Self::new(StatusCode::BAD_GATEWAY, message)
            }
            IngestError::Backend(ref e) => Self::new(backend_status(e), message),
            IngestError::Submission {
                category,
                error: inner,
                acknowledged,
            } => {
                let status = match inner.as_ref() {
                    IngestError::Backend(e) => backend_status(e),
                    IngestError::Validation(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::BAD_GATEWAY,
                };
                Self::new(status, message).with_details(serde_json::json!({
                    "failed_category": category,
                    "acknowledged": acknowledged,
                }))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                details: self.details,
            }),
        )
            .into_response()
    }
}

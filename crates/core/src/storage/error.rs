//! Error types for the storage module.

use thiserror::Error;

/// Failures obtaining temporary storage credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// HTTP request to the identity provider failed.
    #[error("Identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The identity provider refused the exchange.
    #[error("Identity provider error: {status} - {message}")]
    IdentityProvider { status: u16, message: String },

    /// The response could not be understood.
    #[error("Failed to parse identity provider response: {0}")]
    Decode(String),
}

/// Why a single upload failed.
#[derive(Debug, Error)]
pub enum UploadFailure {
    /// HTTP request to the object store failed.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The object store answered with a non-success status.
    #[error("storage rejected upload with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The object URL could not be built.
    #[error("invalid object URL: {0}")]
    InvalidUrl(String),
}

/// A failed upload of one file. Never retried by the uploader.
#[derive(Debug, Error)]
#[error("Failed to upload {file_name}: {cause}")]
pub struct UploadError {
    pub file_name: String,
    #[source]
    pub cause: UploadFailure,
}

impl UploadError {
    pub fn new(file_name: impl Into<String>, cause: UploadFailure) -> Self {
        Self {
            file_name: file_name.into(),
            cause,
        }
    }

    /// Whether the store refused the credentials (expired or revoked).
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self.cause,
            UploadFailure::Rejected {
                status: 401 | 403,
                ..
            }
        )
    }
}

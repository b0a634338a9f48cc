//! Error types for the ingestion pipeline.

use thiserror::Error;

use crate::backend::BackendError;
use crate::storage::{CredentialError, UploadError};

use super::types::DocumentCategory;
use super::validate::ValidationError;

/// Errors that can end an ingestion batch.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A task failed local validation; nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Storage credentials could not be obtained; nothing was uploaded.
    #[error("Could not obtain upload credentials: {0}")]
    Credentials(#[from] CredentialError),

    /// At least one upload failed; nothing was registered.
    ///
    /// `orphaned_keys` lists objects that did upload and now sit in storage
    /// unreferenced.
    #[error("{error}")]
    Upload {
        #[source]
        error: UploadError,
        orphaned_keys: Vec<String>,
    },

    /// The backend refused a registration call.
    #[error("{0}")]
    Backend(#[from] BackendError),

    /// A category's registration failed after uploads succeeded.
    ///
    /// Categories in `acknowledged` were registered and stay registered.
    #[error("Registering {category} documents failed: {error}")]
    Submission {
        category: DocumentCategory,
        #[source]
        error: Box<IngestError>,
        acknowledged: Vec<DocumentCategory>,
    },
}

impl IngestError {
    /// The single message shown to the borrower.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Credentials(_) => "Upload failed, please try again".to_string(),
            Self::Upload { error, .. } => {
                format!("Upload of {} failed, please try again", error.file_name)
            }
            Self::Backend(e) => e.to_string(),
            Self::Submission { error, .. } => error.user_message(),
        }
    }
}

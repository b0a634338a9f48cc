//! Lending backend REST client.
//!
//! The backend owns every verification flag; this side only reads the
//! borrower profile and registers documents or form data against it.

mod http;
mod types;

pub use http::HttpBackend;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::profile::{BorrowerProfile, EmploymentRecord};

/// Errors that can occur when talking to the lending backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    ///
    /// `message` is the backend's own `message` field, shown to the borrower as is.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl BackendError {
    /// HTTP status reported by the backend, if it answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Operations the borrower client needs from the lending backend.
#[async_trait]
pub trait BorrowerBackend: Send + Sync {
    /// `GET /borrower/{id}/profile`
    async fn fetch_profile(&self, borrower_id: &str) -> Result<BorrowerProfile, BackendError>;

    /// `POST /kyc-docs/add`
    async fn add_documents(&self, request: &AddDocumentsRequest) -> Result<Ack, BackendError>;

    /// `PUT /kyc-docs/{id}/update-employment`
    async fn update_employment(
        &self,
        borrower_id: &str,
        employment: &EmploymentRecord,
    ) -> Result<Ack, BackendError>;

    /// `PUT /bank-detail`
    async fn update_bank_detail(&self, detail: &BankDetail) -> Result<Ack, BackendError>;

    /// `GET /loan-application/{id}/details`
    async fn loan_application_details(
        &self,
        application_id: &str,
    ) -> Result<LoanApplicationDetails, BackendError>;
}

//! Testing utilities and mock implementations.
//!
//! Mocks for every external seam (lending backend, identity provider,
//! object store) so the progress engine and the ingestion pipeline can be
//! exercised end to end without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use loanport_core::testing::{fixtures, MockBackend, MockCredentialBroker, MockObjectStore};
//!
//! let backend = MockBackend::new();
//! backend.set_profile("b-1", fixtures::verified_profile()).await;
//!
//! let store = MockObjectStore::new();
//! store.fail_upload("march.pdf", 500).await;
//!
//! // Use in AppState...
//! ```

mod mock_backend;
mod mock_storage;

pub use mock_backend::{MockBackend, RecordedBackendCall};
pub use mock_storage::{MockCredentialBroker, MockObjectStore, RecordedUpload};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::ingest::{DocumentCategory, UploadTask};
    use crate::profile::{
        ApplicationStatus, BorrowerProfile, EmploymentRecord, LoanDocument, LoanProgress,
    };
    use crate::storage::DocumentFile;

    /// Create an upload task with a small non-empty body.
    pub fn task(category: DocumentCategory, file_name: &str, content_type: &str) -> UploadTask {
        UploadTask::new(
            DocumentFile::new(file_name, content_type, b"%PDF-1.4 test".to_vec()),
            category,
        )
    }

    /// Create a PDF upload task.
    pub fn pdf_task(category: DocumentCategory, file_name: &str) -> UploadTask {
        task(category, file_name, "application/pdf")
    }

    /// A borrower who just signed up.
    pub fn new_profile() -> BorrowerProfile {
        BorrowerProfile::default()
    }

    /// Identity checks done, employment and bank details pending.
    pub fn kyc_verified_profile() -> BorrowerProfile {
        BorrowerProfile {
            aadhaar_verified: true,
            pan_verified: true,
            loan_progress: LoanProgress {
                aadhaar_verified: true,
                pan_verified: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Every onboarding gate passed; application under review.
    pub fn verified_profile() -> BorrowerProfile {
        BorrowerProfile {
            employment_details: Some(EmploymentRecord {
                employer_name: "Acme Corp".to_string(),
                designation: Some("Engineer".to_string()),
                monthly_income: Some(85_000.0),
                ..Default::default()
            }),
            bank_details_available: true,
            loan_progress: LoanProgress {
                aadhaar_verified: true,
                pan_verified: true,
                kyc_done: true,
                eligibility_passed: false,
            },
            application_status: ApplicationStatus::InReview,
            loan_documents: vec![LoanDocument { verified: true }, LoanDocument { verified: true }],
            ..kyc_verified_profile()
        }
    }

    /// Fully approved application.
    pub fn approved_profile() -> BorrowerProfile {
        let mut profile = verified_profile();
        profile.loan_progress.eligibility_passed = true;
        profile.application_status = ApplicationStatus::Approved;
        profile
    }

    /// Rejected application whose documents were all verified.
    pub fn rejected_profile() -> BorrowerProfile {
        let mut profile = verified_profile();
        profile.application_status = ApplicationStatus::Rejected;
        profile
    }
}

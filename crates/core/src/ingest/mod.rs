//! Document ingestion pipeline.
//!
//! Takes the files a borrower attached in one form step and turns them into
//! backend document records:
//!
//! 1. Validate every task locally (content type, size) before any network call
//! 2. Obtain storage credentials once for the whole batch
//! 3. Upload every file concurrently under a deterministic key
//! 4. Fail the batch if any upload failed (nothing is registered)
//! 5. Register the URLs with the backend, one call per category
//!
//! # Partial failure
//!
//! Objects uploaded before a sibling failed stay in storage and are reported
//! as orphaned keys on the error. They are never referenced by a backend
//! record and are not deleted here.
//!
//! # Example
//!
//! ```ignore
//! use loanport_core::ingest::{DocumentCategory, IngestionService, UploadTask};
//! use loanport_core::storage::DocumentFile;
//!
//! let service = IngestionService::new(orchestrator, submitter);
//! let receipt = service
//!     .ingest("borrower-42", vec![
//!         UploadTask::new(
//!             DocumentFile::new("march.pdf", "application/pdf", bytes),
//!             DocumentCategory::Payslip,
//!         ),
//!     ])
//!     .await?;
//! println!("Registered {} documents", receipt.uploads.len());
//! ```

mod error;
mod guard;
mod orchestrator;
mod service;
mod submitter;
mod types;
mod validate;

pub use error::IngestError;
pub use guard::{SubmissionGuard, SubmissionPermit};
pub use orchestrator::UploadOrchestrator;
pub use service::{IngestionReceipt, IngestionService};
pub use submitter::{CategoryOutcome, DocumentSubmitter, SubmissionReport};
pub use types::{group_by_category, CategoryUploads, DocumentCategory, UploadResult, UploadTask};
pub use validate::{pair_access_codes, validate_task, ValidationError};

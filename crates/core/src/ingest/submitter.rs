//! Registers uploaded documents with the backend.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::backend::{Ack, AddDocumentsRequest, BorrowerBackend};
use crate::metrics::DOCUMENT_SUBMISSIONS;

use super::error::IngestError;
use super::types::{group_by_category, DocumentCategory, UploadResult};
use super::validate::pair_access_codes;

/// Outcome of one category's registration call.
#[derive(Debug)]
pub struct CategoryOutcome {
    pub category: DocumentCategory,
    pub document_count: usize,
    pub result: Result<Ack, IngestError>,
}

/// Outcomes of every category in a batch.
///
/// Categories are independent: a failed category does not undo an
/// acknowledged one.
#[derive(Debug, Default)]
pub struct SubmissionReport {
    pub outcomes: Vec<CategoryOutcome>,
}

impl SubmissionReport {
    /// True when every category was acknowledged.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Categories the backend acknowledged.
    pub fn acknowledged(&self) -> Vec<DocumentCategory> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.category)
            .collect()
    }

    /// Turns the report into the first failure, if any.
    pub fn into_result(self) -> Result<Vec<(DocumentCategory, Ack)>, IngestError> {
        let acknowledged = self.acknowledged();
        let mut acks = Vec::with_capacity(self.outcomes.len());
        for outcome in self.outcomes {
            match outcome.result {
                Ok(ack) => acks.push((outcome.category, ack)),
                Err(error) => {
                    return Err(IngestError::Submission {
                        category: outcome.category,
                        error: Box::new(error),
                        acknowledged,
                    })
                }
            }
        }
        Ok(acks)
    }
}

/// Sends one `add documents` call per category.
pub struct DocumentSubmitter {
    backend: Arc<dyn BorrowerBackend>,
}

impl DocumentSubmitter {
    pub fn new(backend: Arc<dyn BorrowerBackend>) -> Self {
        Self { backend }
    }

    /// Registers `urls` of one category against the borrower.
    ///
    /// Access codes pair with URLs by position and default to "".
    pub async fn submit(
        &self,
        category: DocumentCategory,
        urls: &[String],
        access_codes: &[Option<String>],
        subject_id: &str,
    ) -> Result<Ack, IngestError> {
        let access_codes = pair_access_codes(urls.len(), access_codes)?;
        let request = AddDocumentsRequest {
            borrower_id: subject_id.to_string(),
            documents: urls.to_vec(),
            document_type: category,
            access_codes,
        };

        match self.backend.add_documents(&request).await {
            Ok(ack) => {
                DOCUMENT_SUBMISSIONS
                    .with_label_values(&[category.as_str(), "success"])
                    .inc();
                info!(
                    subject_id = %subject_id,
                    category = %category,
                    documents = urls.len(),
                    "Documents registered"
                );
                Ok(ack)
            }
            Err(e) => {
                DOCUMENT_SUBMISSIONS
                    .with_label_values(&[category.as_str(), "error"])
                    .inc();
                warn!(
                    subject_id = %subject_id,
                    category = %category,
                    error = %e,
                    "Document registration failed"
                );
                Err(e.into())
            }
        }
    }

    /// Registers every category present in `results`. All calls are
    /// attempted, concurrently, whatever their individual outcome.
    pub async fn submit_all(&self, results: &[UploadResult], subject_id: &str) -> SubmissionReport {
        let groups = group_by_category(results);
        let calls = groups.iter().map(|group| async move {
            CategoryOutcome {
                category: group.category,
                document_count: group.urls.len(),
                result: self
                    .submit(group.category, &group.urls, &group.access_codes, subject_id)
                    .await,
            }
        });

        SubmissionReport {
            outcomes: join_all(calls).await,
        }
    }
}

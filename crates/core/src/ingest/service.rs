//! End-to-end ingestion of one form submission.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::Ack;

use super::error::IngestError;
use super::orchestrator::UploadOrchestrator;
use super::submitter::DocumentSubmitter;
use super::types::{DocumentCategory, UploadResult, UploadTask};

/// What a successful ingestion produced.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReceipt {
    pub batch_id: Uuid,
    pub uploads: Vec<UploadResult>,
    pub acknowledgements: Vec<(DocumentCategory, Ack)>,
}

/// Uploads a batch, then registers it with the backend.
pub struct IngestionService {
    orchestrator: UploadOrchestrator,
    submitter: DocumentSubmitter,
}

impl IngestionService {
    pub fn new(orchestrator: UploadOrchestrator, submitter: DocumentSubmitter) -> Self {
        Self {
            orchestrator,
            submitter,
        }
    }

    /// Runs the whole pipeline for `subject_id`.
    ///
    /// Nothing is registered unless every upload succeeded. Once uploads
    /// succeed, every category is submitted; the first failed category is
    /// returned with the list of categories that were acknowledged.
    pub async fn ingest(
        &self,
        subject_id: &str,
        tasks: Vec<UploadTask>,
    ) -> Result<IngestionReceipt, IngestError> {
        let batch_id = Uuid::new_v4();
        info!(batch_id = %batch_id, subject_id = %subject_id, files = tasks.len(), "Ingesting documents");

        let uploads = self.orchestrator.upload_all(&tasks, subject_id).await?;
        if uploads.is_empty() {
            return Ok(IngestionReceipt {
                batch_id,
                uploads,
                acknowledgements: Vec::new(),
            });
        }

        let report = self.submitter.submit_all(&uploads, subject_id).await;
        match report.into_result() {
            Ok(acknowledgements) => {
                info!(batch_id = %batch_id, categories = acknowledgements.len(), "Ingestion complete");
                Ok(IngestionReceipt {
                    batch_id,
                    uploads,
                    acknowledgements,
                })
            }
            Err(e) => {
                warn!(batch_id = %batch_id, error = %e, "Ingestion incomplete");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::backend::BackendError;
    use crate::testing::{fixtures, MockBackend, MockCredentialBroker, MockObjectStore};

    struct Harness {
        backend: MockBackend,
        store: MockObjectStore,
        service: IngestionService,
    }

    fn harness() -> Harness {
        let backend = MockBackend::new();
        let store = MockObjectStore::new();
        let orchestrator = UploadOrchestrator::new(
            Arc::new(MockCredentialBroker::new()),
            Arc::new(store.clone()),
            1024 * 1024,
        );
        let submitter = DocumentSubmitter::new(Arc::new(backend.clone()));
        Harness {
            backend,
            store,
            service: IngestionService::new(orchestrator, submitter),
        }
    }

    #[tokio::test]
    async fn test_ingest_registers_each_category_once() {
        let h = harness();
        let receipt = h
            .service
            .ingest(
                "b-7",
                vec![
                    fixtures::pdf_task(DocumentCategory::Payslip, "jan.pdf"),
                    fixtures::pdf_task(DocumentCategory::Payslip, "feb.pdf"),
                    fixtures::pdf_task(DocumentCategory::BankStatement, "stmt.pdf")
                        .with_access_code("secret"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(receipt.uploads.len(), 3);
        assert_eq!(receipt.acknowledgements.len(), 2);

        let requests = h.backend.document_requests().await;
        assert_eq!(requests.len(), 2);
        let payslips = requests
            .iter()
            .find(|r| r.document_type == DocumentCategory::Payslip)
            .unwrap();
        assert_eq!(payslips.documents.len(), 2);
        assert_eq!(payslips.access_codes, vec!["", ""]);
        let statements = requests
            .iter()
            .find(|r| r.document_type == DocumentCategory::BankStatement)
            .unwrap();
        assert_eq!(statements.access_codes, vec!["secret"]);
    }

    #[tokio::test]
    async fn test_upload_failure_registers_nothing() {
        let h = harness();
        h.store.fail_upload("feb.pdf", 500).await;

        let err = h
            .service
            .ingest(
                "b-7",
                vec![
                    fixtures::pdf_task(DocumentCategory::Payslip, "jan.pdf"),
                    fixtures::pdf_task(DocumentCategory::Payslip, "feb.pdf"),
                ],
            )
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Upload of feb.pdf failed, please try again");
        assert!(h.backend.document_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_submission_failure_reports_acknowledged_categories() {
        let h = harness();
        h.backend
            .fail_category(
                DocumentCategory::ResidenceProof,
                BackendError::Api {
                    status: 400,
                    message: "Address proof expired".to_string(),
                },
            )
            .await;

        let err = h
            .service
            .ingest(
                "b-7",
                vec![
                    fixtures::pdf_task(DocumentCategory::EmployeeId, "id.pdf"),
                    fixtures::pdf_task(DocumentCategory::ResidenceProof, "bill.pdf"),
                ],
            )
            .await
            .unwrap_err();

        match err {
            IngestError::Submission {
                category,
                acknowledged,
                ..
            } => {
                assert_eq!(category, DocumentCategory::ResidenceProof);
                assert_eq!(acknowledged, vec![DocumentCategory::EmployeeId]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_submission_is_a_no_op() {
        let h = harness();
        let receipt = h.service.ingest("b-7", Vec::new()).await.unwrap();
        assert!(receipt.uploads.is_empty());
        assert!(h.backend.document_requests().await.is_empty());
    }
}

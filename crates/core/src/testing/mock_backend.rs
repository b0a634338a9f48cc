//! Mock lending backend for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::{
    Ack, AddDocumentsRequest, BackendError, BankDetail, BorrowerBackend, LoanApplicationDetails,
};
use crate::ingest::DocumentCategory;
use crate::profile::{BorrowerProfile, EmploymentRecord};

/// A recorded backend call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedBackendCall {
    FetchProfile { borrower_id: String },
    AddDocuments(AddDocumentsRequest),
    UpdateEmployment { borrower_id: String, employment: EmploymentRecord },
    UpdateBankDetail(BankDetail),
    LoanApplicationDetails { application_id: String },
}

/// Mock implementation of the BorrowerBackend trait.
///
/// Provides controllable behavior for testing:
/// - Serve configured profiles and loan applications
/// - Record every call for assertions
/// - Fail document registration per category
/// - Fail the next call with a given error
#[derive(Debug, Clone)]
pub struct MockBackend {
    profiles: Arc<RwLock<HashMap<String, BorrowerProfile>>>,
    applications: Arc<RwLock<HashMap<String, LoanApplicationDetails>>>,
    calls: Arc<RwLock<Vec<RecordedBackendCall>>>,
    /// Categories whose `add_documents` call fails with the stored error.
    failing_categories: Arc<RwLock<HashMap<DocumentCategory, (u16, String)>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<BackendError>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend with no borrowers.
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(RwLock::new(HashMap::new())),
            applications: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            failing_categories: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub async fn set_profile(&self, borrower_id: &str, profile: BorrowerProfile) {
        self.profiles
            .write()
            .await
            .insert(borrower_id.to_string(), profile);
    }

    pub async fn set_loan_application(&self, details: LoanApplicationDetails) {
        self.applications
            .write()
            .await
            .insert(details.id.clone(), details);
    }

    /// Make every `add_documents` call for `category` fail.
    ///
    /// Only `BackendError::Api` is reproducible; other variants fail with
    /// status 500 and their display text.
    pub async fn fail_category(&self, category: DocumentCategory, error: BackendError) {
        let entry = match error {
            BackendError::Api { status, message } => (status, message),
            other => (500, other.to_string()),
        };
        self.failing_categories.write().await.insert(category, entry);
    }

    /// Set an error to be returned on the next operation.
    pub async fn set_next_error(&self, error: BackendError) {
        *self.next_error.write().await = Some(error);
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    pub async fn recorded_calls(&self) -> Vec<RecordedBackendCall> {
        self.calls.read().await.clone()
    }

    /// All `add_documents` requests, in call order.
    pub async fn document_requests(&self) -> Vec<AddDocumentsRequest> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedBackendCall::AddDocuments(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    async fn record(&self, call: RecordedBackendCall) -> Result<(), BackendError> {
        self.calls.write().await.push(call);
        match self.next_error.write().await.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BorrowerBackend for MockBackend {
    async fn fetch_profile(&self, borrower_id: &str) -> Result<BorrowerProfile, BackendError> {
        self.record(RecordedBackendCall::FetchProfile {
            borrower_id: borrower_id.to_string(),
        })
        .await?;

        self.profiles
            .read()
            .await
            .get(borrower_id)
            .cloned()
            .ok_or_else(|| BackendError::Api {
                status: 404,
                message: "Borrower not found".to_string(),
            })
    }

    async fn add_documents(&self, request: &AddDocumentsRequest) -> Result<Ack, BackendError> {
        self.record(RecordedBackendCall::AddDocuments(request.clone()))
            .await?;

        if let Some((status, message)) = self
            .failing_categories
            .read()
            .await
            .get(&request.document_type)
        {
            return Err(BackendError::Api {
                status: *status,
                message: message.clone(),
            });
        }

        Ok(Ack {
            message: Some("Documents added".to_string()),
        })
    }

    async fn update_employment(
        &self,
        borrower_id: &str,
        employment: &EmploymentRecord,
    ) -> Result<Ack, BackendError> {
        self.record(RecordedBackendCall::UpdateEmployment {
            borrower_id: borrower_id.to_string(),
            employment: employment.clone(),
        })
        .await?;

        if let Some(profile) = self.profiles.write().await.get_mut(borrower_id) {
            profile.employment_details = Some(employment.clone());
        }
        Ok(Ack {
            message: Some("Employment updated".to_string()),
        })
    }

    async fn update_bank_detail(&self, detail: &BankDetail) -> Result<Ack, BackendError> {
        self.record(RecordedBackendCall::UpdateBankDetail(detail.clone()))
            .await?;

        if let Some(profile) = self.profiles.write().await.get_mut(&detail.borrower_id) {
            profile.bank_details_available = true;
        }
        Ok(Ack {
            message: Some("Bank detail updated".to_string()),
        })
    }

    async fn loan_application_details(
        &self,
        application_id: &str,
    ) -> Result<LoanApplicationDetails, BackendError> {
        self.record(RecordedBackendCall::LoanApplicationDetails {
            application_id: application_id.to_string(),
        })
        .await?;

        self.applications
            .read()
            .await
            .get(application_id)
            .cloned()
            .ok_or_else(|| BackendError::Api {
                status: 404,
                message: "Loan application not found".to_string(),
            })
    }
}

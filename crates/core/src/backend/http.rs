//! HTTP implementation of the lending backend client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::EnvironmentConfig;
use crate::profile::{BorrowerProfile, EmploymentRecord};

use super::{AddDocumentsRequest, Ack, BackendError, BankDetail, BorrowerBackend, LoanApplicationDetails};

/// JSON-over-HTTPS backend client.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a new backend client.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from an environment block.
    pub fn from_environment(env: &EnvironmentConfig) -> Result<Self, BackendError> {
        Self::new(
            env.base_url.clone(),
            Duration::from_secs(env.timeout_secs as u64),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason()),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            // Some mutating endpoints answer 204 / empty 200
            return serde_json::from_str("{}")
                .map_err(|e| BackendError::Decode(format!("Empty response body: {}", e)));
        }
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// The backend's `message` field verbatim; the raw body when it is not JSON.
fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("Request failed").to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl BorrowerBackend for HttpBackend {
    async fn fetch_profile(&self, borrower_id: &str) -> Result<BorrowerProfile, BackendError> {
        let url = self.url(&format!("/borrower/{}/profile", urlencoding::encode(borrower_id)));
        debug!(borrower_id = %borrower_id, "Fetching borrower profile");
        self.send(self.client.get(&url)).await
    }

    async fn add_documents(&self, request: &AddDocumentsRequest) -> Result<Ack, BackendError> {
        debug!(
            borrower_id = %request.borrower_id,
            document_type = ?request.document_type,
            documents = request.documents.len(),
            "Registering documents"
        );
        self.send(self.client.post(self.url("/kyc-docs/add")).json(request))
            .await
    }

    async fn update_employment(
        &self,
        borrower_id: &str,
        employment: &EmploymentRecord,
    ) -> Result<Ack, BackendError> {
        let url = self.url(&format!(
            "/kyc-docs/{}/update-employment",
            urlencoding::encode(borrower_id)
        ));
        self.send(self.client.put(&url).json(employment)).await
    }

    async fn update_bank_detail(&self, detail: &BankDetail) -> Result<Ack, BackendError> {
        self.send(self.client.put(self.url("/bank-detail")).json(detail))
            .await
    }

    async fn loan_application_details(
        &self,
        application_id: &str,
    ) -> Result<LoanApplicationDetails, BackendError> {
        let url = self.url(&format!(
            "/loan-application/{}/details",
            urlencoding::encode(application_id)
        ));
        self.send(self.client.get(&url)).await
    }
}

//! Mock credential broker and object store for testing.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{
    CredentialBroker, CredentialError, Credentials, DocumentFile, ObjectStore, UploadError,
    UploadFailure,
};

/// Mock implementation of the CredentialBroker trait.
///
/// Every call mints a new credential set (`MOCKKEY{n}`) valid for the
/// configured lifetime, one hour by default.
#[derive(Debug, Clone)]
pub struct MockCredentialBroker {
    calls: Arc<RwLock<usize>>,
    invalidations: Arc<RwLock<usize>>,
    lifetime: Arc<RwLock<Duration>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<CredentialError>>>,
}

impl Default for MockCredentialBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCredentialBroker {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(0)),
            invalidations: Arc::new(RwLock::new(0)),
            lifetime: Arc::new(RwLock::new(Duration::hours(1))),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Number of `credentials` calls, failed ones included.
    pub async fn call_count(&self) -> usize {
        *self.calls.read().await
    }

    pub async fn invalidation_count(&self) -> usize {
        *self.invalidations.read().await
    }

    /// Lifetime of credentials minted from now on.
    pub async fn set_lifetime(&self, lifetime: Duration) {
        *self.lifetime.write().await = lifetime;
    }

    /// Set an error to be returned on the next call.
    pub async fn set_next_error(&self, error: CredentialError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl CredentialBroker for MockCredentialBroker {
    async fn credentials(&self) -> Result<Credentials, CredentialError> {
        let n = {
            let mut calls = self.calls.write().await;
            *calls += 1;
            *calls
        };

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(Credentials {
            access_key_id: format!("MOCKKEY{}", n),
            secret_access_key: "mock-secret".to_string(),
            session_token: Some(format!("mock-session-{}", n)),
            expires_at: Utc::now() + *self.lifetime.read().await,
        })
    }

    async fn invalidate(&self) {
        *self.invalidations.write().await += 1;
    }
}

/// A recorded upload for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub key: String,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub access_key_id: String,
}

/// Mock implementation of the ObjectStore trait.
///
/// Provides controllable behavior for testing:
/// - Record successful uploads for assertions
/// - Fail uploads of chosen file names with an HTTP status
/// - Delay every upload to observe concurrency
#[derive(Debug, Clone)]
pub struct MockObjectStore {
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    /// File name -> status to reject it with.
    failures: Arc<RwLock<HashMap<String, u16>>>,
    delay: Arc<RwLock<Option<std::time::Duration>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            delay: Arc::new(RwLock::new(None)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Reject uploads of `file_name` with `status`.
    pub async fn fail_upload(&self, file_name: &str, status: u16) {
        self.failures
            .write()
            .await
            .insert(file_name.to_string(), status);
    }

    /// Hold every upload for `delay` before answering.
    pub async fn set_delay(&self, delay: std::time::Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Successful uploads, in completion order.
    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    /// Number of successful uploads.
    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    /// Highest number of uploads observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    fn name(&self) -> &str {
        "mock"
    }

    fn object_url(&self, key: &str) -> String {
        format!("https://mock-bucket.local/{}", key)
    }

    async fn upload(
        &self,
        file: &DocumentFile,
        key: &str,
        credentials: &Credentials,
    ) -> Result<String, UploadError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failures.read().await.get(&file.file_name).copied();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(status) = failure {
            return Err(UploadError::new(
                file.file_name.clone(),
                UploadFailure::Rejected {
                    status,
                    body: "mock rejection".to_string(),
                },
            ));
        }

        self.uploads.write().await.push(RecordedUpload {
            key: key.to_string(),
            file_name: file.file_name.clone(),
            content_type: file.content_type.clone(),
            size: file.size(),
            access_key_id: credentials.access_key_id.clone(),
        });
        Ok(self.object_url(key))
    }
}

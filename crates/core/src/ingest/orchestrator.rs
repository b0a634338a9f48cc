//! Concurrent upload of one batch with all-or-nothing semantics.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::metrics::{UPLOADS_TOTAL, UPLOAD_BATCHES, UPLOAD_BATCH_DURATION};
use crate::storage::{build_key, CredentialBroker, ObjectStore};

use super::error::IngestError;
use super::types::{category_order, UploadResult, UploadTask};
use super::validate::validate_task;

/// Fans out one upload per task and joins them.
pub struct UploadOrchestrator {
    broker: Arc<dyn CredentialBroker>,
    store: Arc<dyn ObjectStore>,
    max_file_bytes: u64,
    /// Last key millisecond handed out; batches never reuse one.
    last_key_millis: AtomicI64,
}

impl UploadOrchestrator {
    pub fn new(
        broker: Arc<dyn CredentialBroker>,
        store: Arc<dyn ObjectStore>,
        max_file_bytes: u64,
    ) -> Self {
        Self {
            broker,
            store,
            max_file_bytes,
            last_key_millis: AtomicI64::new(0),
        }
    }

    /// Reserves `count` consecutive key milliseconds starting no earlier than
    /// `now` and strictly after any range handed to a previous batch.
    fn reserve_key_millis(&self, now: DateTime<Utc>, count: usize) -> i64 {
        let now = now.timestamp_millis();
        let count = count as i64;
        let mut last = self.last_key_millis.load(Ordering::Relaxed);
        loop {
            let start = now.max(last + 1);
            match self.last_key_millis.compare_exchange_weak(
                last,
                start + count - 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return start,
                Err(current) => last = current,
            }
        }
    }

    /// Uploads every task and returns results grouped by category.
    ///
    /// - No tasks: returns an empty list without fetching credentials.
    /// - Any task failing validation: rejected before any network call.
    /// - Any upload failing: every upload is still awaited, then the first
    ///   failure in input order is returned with the keys that did upload.
    pub async fn upload_all(
        &self,
        tasks: &[UploadTask],
        subject_id: &str,
    ) -> Result<Vec<UploadResult>, IngestError> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        for task in tasks {
            if let Err(e) = validate_task(task, self.max_file_bytes) {
                UPLOAD_BATCHES.with_label_values(&["validation_error"]).inc();
                return Err(e.into());
            }
        }

        let start = Instant::now();

        let credentials = match self.broker.credentials().await {
            Ok(c) => c,
            Err(e) => {
                warn!(subject_id = %subject_id, error = %e, "Credential exchange failed");
                UPLOAD_BATCHES.with_label_values(&["credential_error"]).inc();
                return Err(e.into());
            }
        };

        // One millisecond per task, never shared with another batch, so
        // same-named files get distinct keys within and across batches.
        let first_millis = self.reserve_key_millis(Utc::now(), tasks.len());
        let keys: Vec<String> = tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                let at = DateTime::from_timestamp_millis(first_millis + i as i64)
                    .unwrap_or_else(Utc::now);
                build_key(task.category.key_prefix(), subject_id, &task.file.file_name, at)
            })
            .collect();

        info!(
            subject_id = %subject_id,
            files = tasks.len(),
            store = self.store.name(),
            "Starting upload batch"
        );

        let uploads = tasks.iter().zip(keys.iter()).map(|(task, key)| {
            let credentials = &credentials;
            async move {
                let result = self.store.upload(&task.file, key, credentials).await;
                let label = if result.is_ok() { "success" } else { "error" };
                UPLOADS_TOTAL
                    .with_label_values(&[task.category.as_str(), label])
                    .inc();
                result
            }
        });
        let outcomes = join_all(uploads).await;

        UPLOAD_BATCH_DURATION.observe(start.elapsed().as_secs_f64());

        let mut results = Vec::with_capacity(tasks.len());
        let mut first_error = None;
        let mut auth_failed = false;
        let mut orphaned_keys = Vec::new();

        for ((task, key), outcome) in tasks.iter().zip(keys).zip(outcomes) {
            match outcome {
                Ok(url) => {
                    debug!(key = %key, url = %url, "Upload complete");
                    orphaned_keys.push(key.clone());
                    results.push(UploadResult {
                        category: task.category,
                        url,
                        original_file_name: task.file.file_name.clone(),
                        key,
                        access_code: task.access_code.clone(),
                    });
                }
                Err(e) => {
                    warn!(file = %e.file_name, error = %e, "Upload failed");
                    auth_failed |= e.is_auth_failure();
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if auth_failed {
            self.broker.invalidate().await;
        }

        if let Some(error) = first_error {
            if !orphaned_keys.is_empty() {
                warn!(
                    subject_id = %subject_id,
                    orphaned = orphaned_keys.len(),
                    keys = ?orphaned_keys,
                    "Batch failed, uploaded objects left unreferenced"
                );
            }
            UPLOAD_BATCHES.with_label_values(&["upload_error"]).inc();
            return Err(IngestError::Upload {
                error,
                orphaned_keys,
            });
        }

        UPLOAD_BATCHES.with_label_values(&["success"]).inc();
        info!(
            subject_id = %subject_id,
            files = results.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Upload batch complete"
        );

        Ok(group_in_place(results))
    }
}

/// Stable regroup: categories in order of first appearance, input order within.
fn group_in_place(mut results: Vec<UploadResult>) -> Vec<UploadResult> {
    let order = category_order(results.iter().map(|r| r.category));
    results.sort_by_key(|r| order.iter().position(|c| *c == r.category));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::DocumentCategory;
    use crate::storage::CredentialError;
    use crate::testing::{fixtures, MockCredentialBroker, MockObjectStore};

    fn orchestrator(broker: &MockCredentialBroker, store: &MockObjectStore) -> UploadOrchestrator {
        UploadOrchestrator::new(Arc::new(broker.clone()), Arc::new(store.clone()), 1024 * 1024)
    }

    #[tokio::test]
    async fn test_empty_batch_skips_credentials() {
        let broker = MockCredentialBroker::new();
        let store = MockObjectStore::new();
        let results = orchestrator(&broker, &store).upload_all(&[], "b-1").await.unwrap();
        assert!(results.is_empty());
        assert_eq!(broker.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_validation_happens_before_credentials() {
        let broker = MockCredentialBroker::new();
        let store = MockObjectStore::new();
        let tasks = vec![
            fixtures::pdf_task(DocumentCategory::Payslip, "ok.pdf"),
            fixtures::task(DocumentCategory::BankStatement, "photo.png", "image/png"),
        ];

        let err = orchestrator(&broker, &store).upload_all(&tasks, "b-1").await.unwrap_err();
        assert!(matches!(err, IngestError::Validation(_)));
        assert_eq!(broker.call_count().await, 0);
        assert_eq!(store.upload_count().await, 0);
    }

    #[tokio::test]
    async fn test_credential_failure_aborts_batch() {
        let broker = MockCredentialBroker::new();
        broker
            .set_next_error(CredentialError::IdentityProvider {
                status: 400,
                message: "bad pool".to_string(),
            })
            .await;
        let store = MockObjectStore::new();
        let tasks = vec![fixtures::pdf_task(DocumentCategory::Payslip, "a.pdf")];

        let err = orchestrator(&broker, &store).upload_all(&tasks, "b-1").await.unwrap_err();
        assert!(matches!(err, IngestError::Credentials(_)));
        assert_eq!(store.upload_count().await, 0);
    }

    #[tokio::test]
    async fn test_same_named_files_get_distinct_keys() {
        let broker = MockCredentialBroker::new();
        let store = MockObjectStore::new();
        let tasks = vec![
            fixtures::pdf_task(DocumentCategory::Payslip, "payslip.pdf"),
            fixtures::pdf_task(DocumentCategory::Payslip, "payslip.pdf"),
        ];

        let results = orchestrator(&broker, &store).upload_all(&tasks, "b-1").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_ne!(results[0].key, results[1].key);
        assert!(results[0].key.starts_with("payslips/b-1/"));
    }

    #[tokio::test]
    async fn test_results_grouped_by_category() {
        let broker = MockCredentialBroker::new();
        let store = MockObjectStore::new();
        let tasks = vec![
            fixtures::pdf_task(DocumentCategory::Payslip, "p1.pdf"),
            fixtures::pdf_task(DocumentCategory::BankStatement, "s1.pdf"),
            fixtures::pdf_task(DocumentCategory::Payslip, "p2.pdf"),
        ];

        let results = orchestrator(&broker, &store).upload_all(&tasks, "b-1").await.unwrap();
        let names: Vec<_> = results.iter().map(|r| r.original_file_name.as_str()).collect();
        assert_eq!(names, vec!["p1.pdf", "p2.pdf", "s1.pdf"]);
        assert_eq!(broker.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_auth_failure_invalidates_credentials() {
        let broker = MockCredentialBroker::new();
        let store = MockObjectStore::new();
        store.fail_upload("b.pdf", 403).await;
        let tasks = vec![
            fixtures::pdf_task(DocumentCategory::Payslip, "a.pdf"),
            fixtures::pdf_task(DocumentCategory::Payslip, "b.pdf"),
        ];

        let err = orchestrator(&broker, &store).upload_all(&tasks, "b-1").await.unwrap_err();
        match err {
            IngestError::Upload { error, orphaned_keys } => {
                assert_eq!(error.file_name, "b.pdf");
                assert_eq!(orphaned_keys.len(), 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(broker.invalidation_count().await, 1);
    }

    #[tokio::test]
    async fn test_auth_failure_after_other_failure_still_invalidates() {
        let broker = MockCredentialBroker::new();
        let store = MockObjectStore::new();
        store.fail_upload("a.pdf", 500).await;
        store.fail_upload("b.pdf", 403).await;
        let tasks = vec![
            fixtures::pdf_task(DocumentCategory::Payslip, "a.pdf"),
            fixtures::pdf_task(DocumentCategory::Payslip, "b.pdf"),
        ];

        let err = orchestrator(&broker, &store).upload_all(&tasks, "b-1").await.unwrap_err();
        match err {
            IngestError::Upload { error, .. } => assert_eq!(error.file_name, "a.pdf"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(broker.invalidation_count().await, 1);
    }

    #[tokio::test]
    async fn test_back_to_back_batches_never_share_keys() {
        let broker = MockCredentialBroker::new();
        let store = MockObjectStore::new();
        let orchestrator = orchestrator(&broker, &store);
        let tasks = vec![
            fixtures::pdf_task(DocumentCategory::Payslip, "payslip.pdf"),
            fixtures::pdf_task(DocumentCategory::Payslip, "payslip.pdf"),
            fixtures::pdf_task(DocumentCategory::Payslip, "payslip.pdf"),
        ];

        let first = orchestrator.upload_all(&tasks, "b-1").await.unwrap();
        let second = orchestrator.upload_all(&tasks, "b-1").await.unwrap();

        let mut keys: Vec<_> = first.iter().chain(second.iter()).map(|r| r.key.clone()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 6);
    }

    #[test]
    fn test_reserved_key_millis_never_overlap() {
        let orchestrator = orchestrator(&MockCredentialBroker::new(), &MockObjectStore::new());
        let now = Utc::now();
        let first = orchestrator.reserve_key_millis(now, 3);
        let second = orchestrator.reserve_key_millis(now, 2);
        assert_eq!(first, now.timestamp_millis());
        assert_eq!(second, first + 3);
    }

    #[tokio::test]
    async fn test_first_failure_in_input_order_wins() {
        let broker = MockCredentialBroker::new();
        let store = MockObjectStore::new();
        store.fail_upload("b.pdf", 500).await;
        store.fail_upload("c.pdf", 500).await;
        let tasks = vec![
            fixtures::pdf_task(DocumentCategory::Payslip, "a.pdf"),
            fixtures::pdf_task(DocumentCategory::Payslip, "b.pdf"),
            fixtures::pdf_task(DocumentCategory::Payslip, "c.pdf"),
        ];

        let err = orchestrator(&broker, &store).upload_all(&tasks, "b-1").await.unwrap_err();
        match err {
            IngestError::Upload { error, .. } => assert_eq!(error.file_name, "b.pdf"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(broker.invalidation_count().await, 0);
    }
}

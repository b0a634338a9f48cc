//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Document uploads (per file and per batch)
//! - Document submissions to the lending backend
//! - Storage credential exchanges

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts};

// =============================================================================
// Upload Metrics
// =============================================================================

/// Individual file uploads by category and result.
pub static UPLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("loanport_uploads_total", "Total document file uploads"),
        &["category", "result"], // result: "success", "error"
    )
    .unwrap()
});

/// Upload batches by outcome.
pub static UPLOAD_BATCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("loanport_upload_batches_total", "Total upload batches"),
        &["result"], // "success", "validation_error", "credential_error", "upload_error"
    )
    .unwrap()
});

/// Upload batch duration in seconds.
pub static UPLOAD_BATCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "loanport_upload_batch_duration_seconds",
            "Duration of an upload batch from credential fetch to last upload",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
    )
    .unwrap()
});

// =============================================================================
// Backend Metrics
// =============================================================================

/// Document submissions by category and result.
pub static DOCUMENT_SUBMISSIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "loanport_document_submissions_total",
            "Total document registrations sent to the backend",
        ),
        &["category", "result"],
    )
    .unwrap()
});

/// Storage credential exchanges by result.
pub static CREDENTIAL_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "loanport_credential_fetches_total",
            "Total storage credential exchanges",
        ),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(UPLOADS_TOTAL.clone()),
        Box::new(UPLOAD_BATCHES.clone()),
        Box::new(UPLOAD_BATCH_DURATION.clone()),
        Box::new(DOCUMENT_SUBMISSIONS.clone()),
        Box::new(CREDENTIAL_FETCHES.clone()),
    ]
}

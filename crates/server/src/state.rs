use std::sync::Arc;

use loanport_core::{BorrowerBackend, Config, IngestionService, SanitizedConfig, SubmissionGuard};

/// Shared application state
pub struct AppState {
    config: Config,
    backend: Arc<dyn BorrowerBackend>,
    ingestion: IngestionService,
    submissions: SubmissionGuard,
}

impl AppState {
    pub fn new(
        config: Config,
        backend: Arc<dyn BorrowerBackend>,
        ingestion: IngestionService,
    ) -> Self {
        Self {
            config,
            backend,
            ingestion,
            submissions: SubmissionGuard::new(),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &dyn BorrowerBackend {
        self.backend.as_ref()
    }

    pub fn ingestion(&self) -> &IngestionService {
        &self.ingestion
    }

    pub fn submissions(&self) -> &SubmissionGuard {
        &self.submissions
    }
}

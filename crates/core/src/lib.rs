pub mod backend;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod profile;
pub mod progress;
pub mod storage;
pub mod testing;

pub use backend::{BackendError, BorrowerBackend, HttpBackend};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DeploymentMode,
    EnvironmentConfig, SanitizedConfig,
};
pub use ingest::{
    DocumentCategory, DocumentSubmitter, IngestError, IngestionReceipt, IngestionService,
    SubmissionGuard, UploadOrchestrator, UploadResult, UploadTask,
};
pub use profile::BorrowerProfile;
pub use progress::{ProgressReport, Route, Stage};
pub use storage::{
    CachedCredentialBroker, CognitoCredentialBroker, CredentialBroker, DocumentFile, ObjectStore,
    S3ObjectStore,
};

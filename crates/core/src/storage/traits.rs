//! Trait definitions for the storage module.

use async_trait::async_trait;

use super::error::{CredentialError, UploadError};
use super::types::{Credentials, DocumentFile};

/// Source of temporary storage credentials.
#[async_trait]
pub trait CredentialBroker: Send + Sync {
    /// Returns credentials valid for at least one upload batch.
    async fn credentials(&self) -> Result<Credentials, CredentialError>;

    /// Drops any cached credentials so the next call fetches a fresh set.
    async fn invalidate(&self) {}
}

/// A store that accepts single-object uploads.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Public URL for an object key. Built from configuration only, never
    /// from a store response.
    fn object_url(&self, key: &str) -> String;

    /// Uploads one file under `key` and returns its URL.
    async fn upload(
        &self,
        file: &DocumentFile,
        key: &str,
        credentials: &Credentials,
    ) -> Result<String, UploadError>;
}

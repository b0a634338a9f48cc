//! Object storage for borrower documents.
//!
//! This module provides:
//! - [`CredentialBroker`]: exchanges the public identity pool for short-lived
//!   storage credentials ([`CognitoCredentialBroker`], cached by
//!   [`CachedCredentialBroker`] for their validity window)
//! - [`build_key`]: deterministic, collision-resistant object keys
//! - [`ObjectStore`]: single-object uploads returning a resolvable URL
//!   ([`S3ObjectStore`], signed with AWS Signature V4)
//!
//! Uploads are never retried here; retry policy belongs to the caller.

mod cognito;
mod credentials;
mod error;
mod key;
mod s3;
mod sigv4;
mod traits;
mod types;

pub use cognito::CognitoCredentialBroker;
pub use credentials::CachedCredentialBroker;
pub use error::{CredentialError, UploadError, UploadFailure};
pub use key::{build_key, sanitize_file_name};
pub use s3::S3ObjectStore;
pub use traits::{CredentialBroker, ObjectStore};
pub use types::{Credentials, DocumentFile};

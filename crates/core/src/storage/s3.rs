//! S3 object store using signed single PUT requests.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::EnvironmentConfig;

use super::error::{UploadError, UploadFailure};
use super::sigv4::{amz_date, payload_hash, SigningRequest};
use super::traits::ObjectStore;
use super::types::{Credentials, DocumentFile};

/// S3 (or S3-compatible) store for borrower documents.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    region: String,
    /// Path-style endpoint override; virtual-hosted AWS URLs when unset.
    endpoint: Option<String>,
}

impl S3ObjectStore {
    /// Create a new store for the given bucket.
    pub fn new(
        bucket: impl Into<String>,
        region: impl Into<String>,
        endpoint: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            bucket: bucket.into(),
            region: region.into(),
            endpoint: endpoint.map(|e| e.trim_end_matches('/').to_string()),
        })
    }

    /// Create a store from an environment block.
    pub fn from_environment(env: &EnvironmentConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            env.storage_bucket.clone(),
            env.storage_region.clone(),
            env.storage_endpoint.clone(),
            Duration::from_secs(env.timeout_secs as u64),
        )
    }

    /// Host header value for a URL, including a non-default port.
    fn host_header(url: &Url) -> Option<String> {
        let host = url.host_str()?;
        Some(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }
}

/// URI-encodes each key segment, keeping the `/` separators.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &str {
        "s3"
    }

    fn object_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint, self.bucket, encode_key(key)),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket,
                self.region,
                encode_key(key)
            ),
        }
    }

    async fn upload(
        &self,
        file: &DocumentFile,
        key: &str,
        credentials: &Credentials,
    ) -> Result<String, UploadError> {
        let object_url = self.object_url(key);
        let url = Url::parse(&object_url)
            .map_err(|e| UploadError::new(&file.file_name, UploadFailure::InvalidUrl(e.to_string())))?;
        let host = Self::host_header(&url).ok_or_else(|| {
            UploadError::new(
                &file.file_name,
                UploadFailure::InvalidUrl(format!("no host in {}", object_url)),
            )
        })?;

        let now = Utc::now();
        let body_hash = payload_hash(&file.bytes);

        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), host);
        headers.insert("x-amz-content-sha256".to_string(), body_hash.clone());
        headers.insert("x-amz-date".to_string(), amz_date(now));
        if let Some(token) = &credentials.session_token {
            headers.insert("x-amz-security-token".to_string(), token.clone());
        }

        let signing = SigningRequest {
            method: "PUT",
            canonical_uri: url.path(),
            headers,
            payload_hash: &body_hash,
            region: &self.region,
            service: "s3",
            now,
        };
        let authorization = signing.authorization(credentials);

        debug!(
            key = %key,
            bytes = file.bytes.len(),
            content_type = %file.content_type,
            "Uploading object"
        );

        let mut request = self
            .client
            .put(url.clone())
            .header("content-type", &file.content_type)
            .header("authorization", authorization);
        for (name, value) in &signing.headers {
            if name != "host" {
                request = request.header(name.as_str(), value.as_str());
            }
        }

        let response = request
            .body(file.bytes.clone())
            .send()
            .await
            .map_err(|e| UploadError::new(&file.file_name, UploadFailure::Transport(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::new(
                &file.file_name,
                UploadFailure::Rejected {
                    status: status.as_u16(),
                    body,
                },
            ));
        }

        Ok(object_url)
    }
}

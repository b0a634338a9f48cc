//! Federated identity exchange (Cognito Identity, unauthenticated role).
//!
//! Two JSON-1.1 calls: `GetId` maps the public pool id to an identity id,
//! `GetCredentialsForIdentity` trades that id for temporary credentials.
//! The identity id is kept and reused for later exchanges.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::EnvironmentConfig;
use crate::metrics::CREDENTIAL_FETCHES;

use super::error::CredentialError;
use super::traits::CredentialBroker;
use super::types::Credentials;

const TARGET_PREFIX: &str = "AWSCognitoIdentityService";

/// Credential broker backed by a Cognito identity pool.
pub struct CognitoCredentialBroker {
    client: Client,
    endpoint: String,
    identity_pool_id: String,
    identity_id: RwLock<Option<String>>,
}

impl CognitoCredentialBroker {
    /// Create a broker for the regional identity endpoint.
    pub fn new(
        region: &str,
        identity_pool_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CredentialError> {
        Self::with_endpoint(
            format!("https://cognito-identity.{}.amazonaws.com/", region),
            identity_pool_id,
            timeout,
        )
    }

    /// Create a broker against an explicit endpoint (useful for testing).
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        identity_pool_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CredentialError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            identity_pool_id: identity_pool_id.into(),
            identity_id: RwLock::new(None),
        })
    }

    /// Create a broker from an environment block.
    pub fn from_environment(env: &EnvironmentConfig) -> Result<Self, CredentialError> {
        Self::new(
            &env.storage_region,
            env.identity_pool_id.clone(),
            Duration::from_secs(env.timeout_secs as u64),
        )
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        body: serde_json::Value,
    ) -> Result<T, CredentialError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/x-amz-json-1.1")
            .header("x-amz-target", format!("{}.{}", TARGET_PREFIX, operation))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ServiceError>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(CredentialError::IdentityProvider {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(|e| {
            CredentialError::Decode(format!("Failed to parse {} response: {}", operation, e))
        })
    }

    async fn identity_id(&self) -> Result<String, CredentialError> {
        if let Some(id) = self.identity_id.read().await.as_ref() {
            return Ok(id.clone());
        }

        let response: GetIdResponse = self
            .call("GetId", json!({ "IdentityPoolId": self.identity_pool_id }))
            .await?;
        debug!(identity_id = %response.identity_id, "Obtained federated identity");

        *self.identity_id.write().await = Some(response.identity_id.clone());
        Ok(response.identity_id)
    }

    async fn exchange(&self) -> Result<Credentials, CredentialError> {
        let identity_id = self.identity_id().await?;
        let result: Result<GetCredentialsResponse, _> = self
            .call(
                "GetCredentialsForIdentity",
                json!({ "IdentityId": identity_id }),
            )
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                // A stale identity id is refused; forget it so the next call starts over
                if matches!(e, CredentialError::IdentityProvider { status: 400, .. }) {
                    warn!("Identity exchange refused, discarding cached identity id");
                    *self.identity_id.write().await = None;
                }
                return Err(e);
            }
        };

        response.credentials.try_into()
    }
}

#[async_trait]
impl CredentialBroker for CognitoCredentialBroker {
    async fn credentials(&self) -> Result<Credentials, CredentialError> {
        let result = self.exchange().await;
        let label = if result.is_ok() { "success" } else { "error" };
        CREDENTIAL_FETCHES.with_label_values(&[label]).inc();
        result
    }
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetIdResponse {
    identity_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetCredentialsResponse {
    credentials: RawCredentials,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawCredentials {
    access_key_id: String,
    secret_key: String,
    #[serde(default)]
    session_token: Option<String>,
    /// Seconds since the epoch.
    expiration: f64,
}

impl TryFrom<RawCredentials> for Credentials {
    type Error = CredentialError;

    fn try_from(raw: RawCredentials) -> Result<Self, Self::Error> {
        let expires_at = DateTime::from_timestamp(raw.expiration as i64, 0).ok_or_else(|| {
            CredentialError::Decode(format!("Invalid expiration: {}", raw.expiration))
        })?;
        Ok(Credentials {
            access_key_id: raw.access_key_id,
            secret_access_key: raw.secret_key,
            session_token: raw.session_token,
            expires_at,
        })
    }
}

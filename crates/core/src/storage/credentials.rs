//! Credential caching.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::error::CredentialError;
use super::traits::CredentialBroker;
use super::types::Credentials;

/// Serves one credential set until it is about to expire.
///
/// A new set is fetched when the cached one expires within `refresh_skew`,
/// or after [`CredentialBroker::invalidate`] (e.g. the store refused it).
pub struct CachedCredentialBroker<B> {
    inner: B,
    cached: RwLock<Option<Credentials>>,
    refresh_skew: Duration,
}

impl<B: CredentialBroker> CachedCredentialBroker<B> {
    pub fn new(inner: B, refresh_skew: Duration) -> Self {
        Self {
            inner,
            cached: RwLock::new(None),
            refresh_skew,
        }
    }

    /// Returns the wrapped broker.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

#[async_trait]
impl<B: CredentialBroker> CredentialBroker for CachedCredentialBroker<B> {
    async fn credentials(&self) -> Result<Credentials, CredentialError> {
        {
            let cached = self.cached.read().await;
            if let Some(creds) = cached.as_ref() {
                if !creds.expires_within(Utc::now(), self.refresh_skew) {
                    return Ok(creds.clone());
                }
            }
        }

        let mut cached = self.cached.write().await;
        // Another caller may have refreshed while we waited for the lock
        if let Some(creds) = cached.as_ref() {
            if !creds.expires_within(Utc::now(), self.refresh_skew) {
                return Ok(creds.clone());
            }
        }

        debug!("Fetching fresh storage credentials");
        let fresh = self.inner.credentials().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    async fn invalidate(&self) {
        *self.cached.write().await = None;
        self.inner.invalidate().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCredentialBroker;

    #[tokio::test]
    async fn test_reuses_credentials_within_window() {
        let mock = MockCredentialBroker::new();
        let broker = CachedCredentialBroker::new(mock.clone(), Duration::seconds(60));

        let a = broker.credentials().await.unwrap();
        let b = broker.credentials().await.unwrap();
        assert_eq!(a, b);
        assert_eq!(mock.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_refreshes_expiring_credentials() {
        let mock = MockCredentialBroker::new();
        mock.set_lifetime(Duration::seconds(30)).await;
        let broker = CachedCredentialBroker::new(mock.clone(), Duration::seconds(60));

        broker.credentials().await.unwrap();
        broker.credentials().await.unwrap();
        assert_eq!(mock.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_fresh_fetch() {
        let mock = MockCredentialBroker::new();
        let broker = CachedCredentialBroker::new(mock.clone(), Duration::seconds(60));

        broker.credentials().await.unwrap();
        broker.invalidate().await;
        broker.credentials().await.unwrap();
        assert_eq!(mock.call_count().await, 2);
        assert_eq!(mock.invalidation_count().await, 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let mock = MockCredentialBroker::new();
        mock.set_next_error(CredentialError::IdentityProvider {
            status: 500,
            message: "unavailable".to_string(),
        })
        .await;
        let broker = CachedCredentialBroker::new(mock.clone(), Duration::seconds(60));

        assert!(broker.credentials().await.is_err());
        assert!(broker.credentials().await.is_ok());
        assert_eq!(mock.call_count().await, 2);
    }
}

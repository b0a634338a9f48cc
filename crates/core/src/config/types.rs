use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub mode: DeploymentMode,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub environments: Environments,
    #[serde(default)]
    pub uploads: UploadConfig,
}

impl Config {
    /// The environment block selected by `mode`.
    pub fn active_environment(&self) -> Option<&EnvironmentConfig> {
        match self.mode {
            DeploymentMode::Development => self.environments.development.as_ref(),
            DeploymentMode::Staging => self.environments.staging.as_ref(),
            DeploymentMode::Production => self.environments.production.as_ref(),
        }
    }
}

/// Deployment mode switch selecting one environment block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentMode {
    #[default]
    Development,
    Staging,
    Production,
}

impl DeploymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Per-mode environment blocks. Only the active one has to be present.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Environments {
    #[serde(default)]
    pub development: Option<EnvironmentConfig>,
    #[serde(default)]
    pub staging: Option<EnvironmentConfig>,
    #[serde(default)]
    pub production: Option<EnvironmentConfig>,
}

/// Backend and object storage endpoints for one deployment.
///
/// The identity pool id is public; no other secret lives here.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnvironmentConfig {
    /// Lending backend base URL (e.g., "https://api.example.com")
    pub base_url: String,
    /// Object storage region (e.g., "ap-south-1")
    pub storage_region: String,
    /// Bucket receiving borrower documents
    pub storage_bucket: String,
    /// Federated identity pool exchanged for temporary storage credentials
    pub identity_pool_id: String,
    /// Path-style storage endpoint override (S3-compatible stores, local testing)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_endpoint: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Document upload limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Largest accepted file in bytes (default: 20 MiB)
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// Cached credentials are refreshed this many seconds before they expire
    #[serde(default = "default_refresh_skew")]
    pub credential_refresh_skew_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            credential_refresh_skew_secs: default_refresh_skew(),
        }
    }
}

fn default_max_file_bytes() -> u64 {
    20 * 1024 * 1024
}

fn default_refresh_skew() -> u64 {
    60
}

/// Sanitized config for API responses
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub mode: String,
    pub server: ServerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<SanitizedEnvironmentConfig>,
    pub uploads: UploadConfig,
}

/// Sanitized environment (identity pool reduced to a flag)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedEnvironmentConfig {
    pub base_url: String,
    pub storage_region: String,
    pub storage_bucket: String,
    pub identity_pool_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            mode: config.mode.as_str().to_string(),
            server: config.server.clone(),
            environment: config
                .active_environment()
                .map(|env| SanitizedEnvironmentConfig {
                    base_url: env.base_url.clone(),
                    storage_region: env.storage_region.clone(),
                    storage_bucket: env.storage_bucket.clone(),
                    identity_pool_configured: !env.identity_pool_id.is_empty(),
                    timeout_secs: env.timeout_secs,
                }),
            uploads: config.uploads.clone(),
        }
    }
}

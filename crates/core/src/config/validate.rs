use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - The environment selected by `mode` exists and is complete
/// - Upload limits are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let mode = config.mode.as_str();
    let env = config.active_environment().ok_or_else(|| {
        ConfigError::ValidationError(format!("environments.{} must be configured", mode))
    })?;

    if !(env.base_url.starts_with("http://") || env.base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "environments.{}.base_url must be an http(s) URL",
            mode
        )));
    }

    for (field, value) in [
        ("storage_region", &env.storage_region),
        ("storage_bucket", &env.storage_bucket),
        ("identity_pool_id", &env.identity_pool_id),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "environments.{}.{} cannot be empty",
                mode, field
            )));
        }
    }

    if config.uploads.max_file_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "uploads.max_file_bytes cannot be 0".to_string(),
        ));
    }

    Ok(())
}

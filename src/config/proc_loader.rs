use std::path::Path;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use tokio::fs;
use tracing::{debug, error};

use crate::config::proc_validator;
use crate::config::service::ServiceConfig;
use crate::config::settings::{LogFormat, LoggingConfig};
use crate::observability::metrics::get_metrics;

/// What a loaded config has to be good for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// Talks to the token endpoint, client credentials are required.
    Refresh,
    /// Only reads the persisted record.
    StoreOnly,
}

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    file_to_scoped_config(path, ConfigScope::Refresh).await
}

pub async fn file_to_scoped_config(path: &Path, scope: ConfigScope) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;

    let expanded = expand_env_vars(&content);
    parse_scoped_config(expanded, scope).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    parse_scoped_config(content, ConfigScope::Refresh).await
}

pub async fn parse_scoped_config(content: String, scope: ConfigScope) -> Result<ServiceConfig> {
    let metrics = get_metrics().await;
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content).inspect_err(|e| {
        error!("parse config error: {}", e);
        metrics.config_validation_errors.inc();
    })?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::Compact));
    }

    debug!("validation config ...");
    validated(service_config, scope).await
}

/// Config without a file: defaults plus environment.
pub async fn env_to_config() -> Result<ServiceConfig> {
    env_to_scoped_config(ConfigScope::Refresh).await
}

pub async fn env_to_scoped_config(scope: ConfigScope) -> Result<ServiceConfig> {
    let mut service_config = ServiceConfig::from_env();
    service_config.settings.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::from_env()));
    validated(service_config, scope).await
}

async fn validated(service_config: ServiceConfig, scope: ConfigScope) -> Result<ServiceConfig> {
    proc_validator::validate_service_config(&service_config, scope)
        .await
        .map_err(|errors| anyhow!("config is not valid: {}", errors.join("; ")))?;
    Ok(service_config)
}

/// Replace `${VAR}` and `${VAR:default}` with environment values.
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks provider credentials and token endpoint
//! - Checks retry, http, storage and logging invariants

use tracing::{error, info};

use crate::config::proc_loader::ConfigScope;
use crate::config::provider::{non_empty, ProviderConfig};
use crate::config::service::ServiceConfig;
use crate::config::settings::{RetryConfig, SettingsConfig};
use crate::observability::metrics::get_metrics;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
/// `StoreOnly` skips the provider checks.
pub async fn validate_service_config(cfg: &ServiceConfig, scope: ConfigScope) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    if scope == ConfigScope::Refresh {
        validate_provider(&cfg.provider, &mut errors);
    }
    validate_settings(&cfg.settings, &mut errors);

    if errors.is_empty() {
        info!("config is valid");
        return Ok(());
    }

    let metrics = get_metrics().await;
    for e in &errors {
        error!("config: {}", e);
        metrics.config_validation_errors.inc();
    }
    Err(errors)
}

fn validate_provider(provider: &ProviderConfig, errors: &mut Vec<String>) {
    if non_empty(&provider.client_id).is_none() {
        errors.push("provider.client_id is required (CLIENT_ID)".to_string());
    }
    if non_empty(&provider.client_secret).is_none() {
        errors.push("provider.client_secret is required (CLIENT_SECRET)".to_string());
    }
    let url = provider.token_url.trim();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        errors.push(format!("provider.token_url '{}' must be an http(s) URL", provider.token_url));
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.database_path.trim().is_empty() {
        errors.push("settings.database_path must not be empty".to_string());
    }
    if settings.http.timeout_ms == 0 {
        errors.push("settings.http.timeout_ms must be > 0".to_string());
    }
    validate_retry(&settings.retry, errors);

    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }

    if settings.metrics.is_enabled && !settings.metrics.path.starts_with('/') {
        errors.push(format!("settings.metrics.path '{}' must start with '/'", settings.metrics.path));
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!("settings.server.port '{}' is not a valid port", settings.server.port));
    }
}

fn validate_retry(retry: &RetryConfig, errors: &mut Vec<String>) {
    if retry.attempts == Some(0) {
        errors.push("settings.retry.attempts must be >= 1".to_string());
    }
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if base > max {
            errors.push(format!(
                "settings.retry.base_delay_ms ({}) must be <= max_delay_ms ({})",
                base, max
            ));
        }
    }
}

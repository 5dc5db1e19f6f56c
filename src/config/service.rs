use serde::Deserialize;

use crate::config::provider::ProviderConfig;
use crate::config::settings::SettingsConfig;
use crate::utils::constants::{
    ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_DATABASE_PATH, ENV_INITIAL_REFRESH_TOKEN, ENV_TOKEN_URL,
};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl ServiceConfig {
    /// Defaults plus credentials from `CLIENT_ID`, `CLIENT_SECRET`,
    /// `INITIAL_REFRESH_TOKEN`; `TOKEN_URL` and `DATABASE_PATH` override defaults.
    pub fn from_env() -> Self {
        let mut config = ServiceConfig::default();
        config.provider.client_id = std::env::var(ENV_CLIENT_ID).ok();
        config.provider.client_secret = std::env::var(ENV_CLIENT_SECRET).ok();
        config.provider.initial_refresh_token = std::env::var(ENV_INITIAL_REFRESH_TOKEN).ok();
        if let Ok(token_url) = std::env::var(ENV_TOKEN_URL) {
            config.provider.token_url = token_url;
        }
        if let Ok(database_path) = std::env::var(ENV_DATABASE_PATH) {
            config.settings.database_path = database_path;
        }
        config
    }
}

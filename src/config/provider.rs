use serde::Deserialize;

use crate::error::TokenError;
use crate::utils::constants::DEFAULT_TOKEN_URL;

/// ================================
/// OAuth2 provider
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// pre-shared refresh token, only read when the store is empty
    #[serde(default)]
    pub initial_refresh_token: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            client_id: None,
            client_secret: None,
            initial_refresh_token: None,
        }
    }
}

/// Client id and secret, both guaranteed non-empty.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

impl ProviderConfig {
    pub fn credentials(&self) -> Result<ClientCredentials, TokenError> {
        let client_id = non_empty(&self.client_id)
            .ok_or_else(|| TokenError::Configuration("client_id is not configured".to_owned()))?;
        let client_secret = non_empty(&self.client_secret)
            .ok_or_else(|| TokenError::Configuration("client_secret is not configured".to_owned()))?;
        Ok(ClientCredentials { client_id, client_secret })
    }

    pub fn bootstrap_refresh_token(&self) -> Option<String> {
        non_empty(&self.initial_refresh_token)
    }
}

/// Blank values count as absent: `${VAR:}` expands to an empty string.
pub fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

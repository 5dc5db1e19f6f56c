use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::StatusCode;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::provider::ClientCredentials;
use crate::config::settings::SettingsConfig;
use crate::error::TokenError;
use crate::resilience::retry::RetrySettings;

static FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
static REFRESH_GRANT: &str = "refresh_token";

/// Successful refresh-grant response. Unknown fields are ignored.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct RefreshGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl std::fmt::Debug for RefreshGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshGrant")
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// Exchanges a refresh token for a new token pair.
pub trait OAuthClient: Send + Sync {
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl std::future::Future<Output = Result<RefreshGrant, TokenError>> + Send;
}

/// Refresh-grant client speaking form-encoded POST with HTTP Basic client auth.
#[derive(Debug, Clone)]
pub struct HttpOAuthClient {
    client: Client,
    token_url: String,
    basic_auth: String,
    retry: RetrySettings,
}

impl HttpOAuthClient {
    pub fn new(client: Client, token_url: String, credentials: &ClientCredentials, retry: RetrySettings) -> Self {
        Self {
            client,
            token_url,
            basic_auth: basic_auth_header(credentials),
            retry,
        }
    }

    /// Builds the reqwest client with the configured timeout.
    pub fn from_settings(
        settings: &SettingsConfig,
        token_url: String,
        credentials: &ClientCredentials,
    ) -> Result<Self, TokenError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.http.timeout_ms))
            .build()?;
        Ok(Self::new(client, token_url, credentials, RetrySettings::from(&settings.retry)))
    }

    async fn refresh_once(&self, refresh_token: &str) -> Result<RefreshGrant, TokenError> {
        let form = [("grant_type", REFRESH_GRANT), ("refresh_token", refresh_token)];

        let response = self
            .client
            .post(&self.token_url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(AUTHORIZATION, &self.basic_auth)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "token endpoint rejected refresh");
            return Err(TokenError::UpstreamAuth { status: status.as_u16(), body });
        }

        let grant: RefreshGrant = serde_json::from_str(&body)
            .map_err(|e| TokenError::InvalidResponse(e.to_string()))?;
        debug!(expires_in = grant.expires_in, "refresh grant received");
        Ok(grant)
    }
}

impl OAuthClient for HttpOAuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshGrant, TokenError> {
        self.retry
            .run_with_retry(|| self.refresh_once(refresh_token))
            .await
    }
}

/// `Basic base64(client_id:client_secret)`
pub fn basic_auth_header(credentials: &ClientCredentials) -> String {
    let raw = format!("{}:{}", credentials.client_id, credentials.client_secret);
    format!("Basic {}", STANDARD.encode(raw))
}

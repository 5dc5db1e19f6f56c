pub mod refresher;
pub mod token;

use crate::cache::refresher::CredentialRefresher;
use crate::config::service::ServiceConfig;
use crate::config::settings::SettingsConfig;
use crate::error::TokenError;
use crate::sources::oauth2::HttpOAuthClient;
use crate::store::{SqliteTokenStore, TokenStore};

/// Refresher wired to the SQLite store and the reqwest client.
pub type Keeper = CredentialRefresher<SqliteTokenStore, HttpOAuthClient>;

/// Opens the store, creates its schema and builds the refresher from config.
/// Missing client credentials fail here, before any token is requested.
pub async fn build_keeper(config: &ServiceConfig) -> Result<Keeper, TokenError> {
    let credentials = config.provider.credentials()?;
    let client = HttpOAuthClient::from_settings(&config.settings, config.provider.token_url.clone(), &credentials)?;

    let store = open_token_store(&config.settings).await?;

    Ok(
        CredentialRefresher::new(store, client, config.provider.bootstrap_refresh_token())
            .with_safety_margin_seconds(config.settings.safety_margin_seconds),
    )
}

/// Opens the configured database and creates its schema. Needs no credentials.
pub async fn open_token_store(settings: &SettingsConfig) -> Result<SqliteTokenStore, TokenError> {
    let store = SqliteTokenStore::connect(&settings.database_path).await?;
    store.initialize().await?;
    Ok(store)
}

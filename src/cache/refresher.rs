//! Credential cache & refresher.
//!
//! Keeps exactly one `TokenRecord` valid:
//! - empty store: bootstrap from the pre-shared refresh token
//! - record expiring within the safety margin: refresh and replace the record
//! - otherwise: hand out the cached access token untouched

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::cache::token::TokenRecord;
use crate::error::TokenError;
use crate::helpers::time::{get_instant, Clock, SystemClock};
use crate::observability::metrics::get_metrics;
use crate::sources::oauth2::OAuthClient;
use crate::store::TokenStore;
use crate::utils::constants::DEFAULT_SAFETY_MARGIN_SECS;

static BOOTSTRAP_PATH: &str = "bootstrap";
static ROTATE_PATH: &str = "rotate";

pub const NO_BOOTSTRAP_MSG: &str = "no cached credential and no bootstrap refresh token available";

pub struct CredentialRefresher<S, C, K = SystemClock> {
    store: S,
    client: C,
    clock: K,
    bootstrap_refresh_token: Option<String>,
    safety_margin_seconds: i64,
    // serializes callers so a rotated refresh token is never spent twice
    lock: Mutex<()>,
}

impl<S, C> CredentialRefresher<S, C, SystemClock>
where
    S: TokenStore,
    C: OAuthClient,
{
    pub fn new(store: S, client: C, bootstrap_refresh_token: Option<String>) -> Self {
        Self::with_clock(store, client, SystemClock, bootstrap_refresh_token)
    }
}

impl<S, C, K> CredentialRefresher<S, C, K>
where
    S: TokenStore,
    C: OAuthClient,
    K: Clock,
{
    pub fn with_clock(store: S, client: C, clock: K, bootstrap_refresh_token: Option<String>) -> Self {
        Self {
            store,
            client,
            clock,
            bootstrap_refresh_token: bootstrap_refresh_token.filter(|t| !t.trim().is_empty()),
            safety_margin_seconds: DEFAULT_SAFETY_MARGIN_SECS as i64,
            lock: Mutex::new(()),
        }
    }

    pub fn with_safety_margin_seconds(mut self, seconds: u64) -> Self {
        self.safety_margin_seconds = seconds as i64;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persisted record as is, without refreshing.
    pub async fn current_record(&self) -> Result<Option<TokenRecord>, TokenError> {
        self.store.load().await
    }

    /// True if `record` would be handed out without a refresh right now.
    pub fn is_fresh(&self, record: &TokenRecord) -> bool {
        record.is_fresh(self.clock.now_unix(), self.safety_margin_seconds)
    }

    /// Returns an access token that stays valid for at least the safety margin,
    /// bootstrapping or refreshing the persisted record when needed.
    pub async fn get_valid_access_token(&self) -> Result<String, TokenError> {
        self.get_valid_record().await.map(|record| record.access_token)
    }

    /// Same as `get_valid_access_token`, returning the whole record.
    pub async fn get_valid_record(&self) -> Result<TokenRecord, TokenError> {
        let _guard = self.lock.lock().await;

        match self.store.load().await? {
            None => {
                let bootstrap = self
                    .bootstrap_refresh_token
                    .as_deref()
                    .ok_or_else(|| TokenError::Configuration(NO_BOOTSTRAP_MSG.to_owned()))
                    .inspect_err(|e| error!("{}", e))?;
                info!("no cached credential, bootstrapping from initial refresh token");
                self.refresh_and_persist(bootstrap, BOOTSTRAP_PATH).await
            }
            Some(record) => {
                let now = self.clock.now_unix();
                if record.is_fresh(now, self.safety_margin_seconds) {
                    debug!(expires_in = record.expires_at - now, "cached access token is valid");
                    get_metrics().await.cache_hits.inc();
                    return Ok(record);
                }
                info!(expires_at = record.expires_at, now, "access token expiring, refreshing");
                self.refresh_and_persist(&record.refresh_token, ROTATE_PATH).await
            }
        }
    }

    async fn refresh_and_persist(&self, refresh_token: &str, path: &str) -> Result<TokenRecord, TokenError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        metrics.refresh_requests.with_label_values(&[path]).inc();

        let result = async {
            let grant = self.client.refresh(refresh_token).await?;
            let expires_at = expiry_from(self.clock.now_unix(), grant.expires_in)?;
            let record = TokenRecord::new(grant.access_token, grant.refresh_token, expires_at);
            self.store.save(&record).await?;
            Ok::<_, TokenError>(record)
        }
        .await;

        metrics
            .refresh_duration
            .with_label_values(&[path])
            .observe(start.elapsed().as_secs_f64());

        match result {
            Ok(record) => {
                metrics.token_expiry_unix.set(record.expires_at);
                info!(path, expires_at = record.expires_at, "token record replaced");
                Ok(record)
            }
            Err(e) => {
                metrics.refresh_failures.with_label_values(&[path, e.kind()]).inc();
                error!(path, "token refresh failed: {}", e);
                Err(e)
            }
        }
    }
}

/// Absolute expiry for a grant; `expires_in` must be positive and fit after `now`.
fn expiry_from(now: i64, expires_in: i64) -> Result<i64, TokenError> {
    if expires_in <= 0 {
        return Err(TokenError::InvalidResponse(format!(
            "expires_in must be positive, got {}",
            expires_in
        )));
    }
    now.checked_add(expires_in)
        .ok_or_else(|| TokenError::InvalidResponse(format!("expires_in {} is out of range", expires_in)))
}

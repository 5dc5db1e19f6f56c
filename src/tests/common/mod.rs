// tests/common/mod.rs
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use crate::config::provider::ProviderConfig;
use crate::config::service::ServiceConfig;
use crate::config::settings::{RetryConfig, SettingsConfig};
use crate::error::TokenError;
use crate::helpers::time::Clock;
use crate::sources::oauth2::{OAuthClient, RefreshGrant};
use crate::store::{SqliteTokenStore, TokenStore};

pub const NOW: i64 = 1_750_000_000;

/// Clock frozen at a settable instant.
#[derive(Debug, Clone)]
pub struct FixedClock(Arc<AtomicI64>);

impl FixedClock {
    pub fn at(now: i64) -> Self {
        Self(Arc::new(AtomicI64::new(now)))
    }

    pub fn advance(&self, seconds: i64) {
        self.0.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scripted OAuth client: replays queued responses and records every refresh token it was given.
#[derive(Clone, Default)]
pub struct FakeOAuthClient {
    responses: Arc<Mutex<VecDeque<Result<RefreshGrant, TokenError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeOAuthClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: Result<RefreshGrant, TokenError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl OAuthClient for FakeOAuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshGrant, TokenError> {
        let response = {
            self.calls.lock().unwrap().push(refresh_token.to_owned());
            self.responses.lock().unwrap().pop_front()
        };
        // let concurrent callers interleave
        tokio::task::yield_now().await;
        response.unwrap_or_else(|| Err(TokenError::InvalidResponse("no scripted response".into())))
    }
}

pub fn grant(access_token: &str, refresh_token: &str, expires_in: i64) -> RefreshGrant {
    RefreshGrant {
        access_token: access_token.to_owned(),
        refresh_token: refresh_token.to_owned(),
        expires_in,
    }
}

pub fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("tokens.db")
}

pub async fn open_store(dir: &TempDir) -> SqliteTokenStore {
    let store = SqliteTokenStore::connect(db_path(dir)).await.expect("open store");
    store.initialize().await.expect("initialize store");
    store
}

/// Config pointing at `token_url` with a database inside `dir` and fast retries.
pub fn service_config(dir: &TempDir, token_url: String, bootstrap: Option<&str>) -> ServiceConfig {
    ServiceConfig {
        settings: SettingsConfig {
            database_path: db_path(dir).to_string_lossy().into_owned(),
            retry: RetryConfig { attempts: Some(2), base_delay_ms: Some(1), max_delay_ms: Some(5) },
            ..SettingsConfig::default()
        },
        provider: ProviderConfig {
            token_url,
            client_id: Some("client-id".to_owned()),
            client_secret: Some("client-secret".to_owned()),
            initial_refresh_token: bootstrap.map(str::to_owned),
        },
    }
}

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

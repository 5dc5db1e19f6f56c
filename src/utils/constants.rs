//! Shared constants and invariants

pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 300;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 200;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 2_000;

pub const DEFAULT_TOKEN_URL: &str = "https://api.bluebeam.com/oauth2/token";
pub const DEFAULT_DATABASE_PATH: &str = "tokens.db";

pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: &str = "8080";

// Environment variables
pub const ENV_CLIENT_ID: &str = "CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const ENV_INITIAL_REFRESH_TOKEN: &str = "INITIAL_REFRESH_TOKEN";
pub const ENV_TOKEN_URL: &str = "TOKEN_URL";
pub const ENV_DATABASE_PATH: &str = "DATABASE_PATH";

use serde::{Deserialize, Serialize};

/// The single persisted credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64, // UNIX TIMESTAMP
}

impl TokenRecord {
    pub fn new(access_token: String, refresh_token: String, expires_at: i64) -> Self {
        Self { access_token, refresh_token, expires_at }
    }

    /// Usable only if it outlives `now + safety_margin_seconds`.
    pub fn is_fresh(&self, now: i64, safety_margin_seconds: i64) -> bool {
        self.expires_at > now.saturating_add(safety_margin_seconds)
    }
}

impl std::fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRecord")
            .field("access_token", &"***")
            .field("refresh_token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Failure kinds surfaced by `CredentialRefresher::get_valid_access_token`.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Client credentials or bootstrap material missing, or the config is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Token endpoint answered with a non-200 status. `body` is the raw response text.
    #[error("token endpoint returned {status}: {body}")]
    UpstreamAuth { status: u16, body: String },

    /// DNS, TLS, connect, reset, timeout or body read failures.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 200 response that is not a refresh grant.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl TokenError {
    /// Stable label for metrics and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Configuration(_) => "configuration_error",
            TokenError::UpstreamAuth { .. } => "upstream_auth_error",
            TokenError::Transport(_) => "transport_error",
            TokenError::InvalidResponse(_) => "invalid_response",
            TokenError::Storage(_) => "storage_error",
        }
    }

    /// Only connection failures are retried: the request was never sent, so the
    /// refresh token cannot have been consumed. Timeouts and body read errors
    /// happen after the provider may have rotated it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TokenError::Transport(e) if e.is_connect())
    }
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        let status = match &self {
            TokenError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            TokenError::UpstreamAuth { .. } => StatusCode::BAD_GATEWAY,
            TokenError::Transport(_) => StatusCode::BAD_GATEWAY,
            TokenError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            TokenError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = json!({
            "error": {
                "code": self.kind(),
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

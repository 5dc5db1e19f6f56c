use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::cache::Keeper;
use crate::error::TokenError;
use crate::server::server::AppState;

pub static TOKEN_PATH: &str = "/token";
pub static HEALTH_PATH: &str = "/health";

#[derive(Clone)]
pub struct TokenState {
    pub keeper: Arc<Keeper>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_at: i64,
}

impl TokenState {
    pub fn new(keeper: Arc<Keeper>) -> Self {
        Self { keeper }
    }

    pub fn router(&self) -> Router<AppState> {
        Router::new()
            .route(TOKEN_PATH, get(get_token))
            .route(HEALTH_PATH, get(health))
    }
}

async fn get_token(State(state): State<AppState>) -> Result<Json<TokenResponse>, TokenError> {
    let record = state.token_state.keeper.get_valid_record().await?;
    Ok(Json(TokenResponse {
        access_token: record.access_token,
        expires_at: record.expires_at,
    }))
}

async fn health() -> &'static str {
    "ok"
}

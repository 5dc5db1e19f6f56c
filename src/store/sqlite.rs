use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, error, info};

use crate::cache::token::TokenRecord;
use crate::error::TokenError;
use crate::observability::metrics::get_metrics;
use crate::store::TokenStore;

static SAVE_OP: &str = "save";
static LOAD_OP: &str = "load";
static INIT_OP: &str = "initialize";

/// `TokenStore` backed by a local SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteTokenStore {
    pool: SqlitePool,
}

impl SqliteTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database file at `path`.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, TokenError> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        // serial access, one connection is all the single slot needs
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .inspect_err(|e| error!("failed to open token database '{}': {}", path.display(), e))?;

        info!("token database opened at '{}'", path.display());
        Ok(Self { pool })
    }

    async fn record_failure(operation: &str, err: &sqlx::Error) {
        error!(operation, "token store failure: {}", err);
        get_metrics()
            .await
            .store_failures
            .with_label_values(&[operation])
            .inc();
    }
}

impl TokenStore for SqliteTokenStore {
    async fn initialize(&self) -> Result<(), TokenError> {
        let res = sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tokens (
                id            INTEGER PRIMARY KEY,
                refresh_token TEXT,
                access_token  TEXT,
                expires_at    INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await;

        if let Err(e) = &res {
            Self::record_failure(INIT_OP, e).await;
        }
        res?;
        debug!("tokens table ready");
        Ok(())
    }

    async fn save(&self, record: &TokenRecord) -> Result<(), TokenError> {
        let res = async {
            let mut tx = self.pool.begin().await?;
            sqlx::query("DELETE FROM tokens").execute(&mut *tx).await?;
            sqlx::query("INSERT INTO tokens (refresh_token, access_token, expires_at) VALUES (?, ?, ?)")
                .bind(&record.refresh_token)
                .bind(&record.access_token)
                .bind(record.expires_at)
                .execute(&mut *tx)
                .await?;
            tx.commit().await
        }
        .await;

        if let Err(e) = &res {
            Self::record_failure(SAVE_OP, e).await;
        }
        res?;
        debug!(expires_at = record.expires_at, "token record replaced");
        Ok(())
    }

    async fn load(&self) -> Result<Option<TokenRecord>, TokenError> {
        let res = sqlx::query("SELECT access_token, refresh_token, expires_at FROM tokens LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .and_then(|row| row.map(row_to_record).transpose());

        if let Err(e) = &res {
            Self::record_failure(LOAD_OP, e).await;
        }
        Ok(res?)
    }
}

fn row_to_record(row: SqliteRow) -> Result<TokenRecord, sqlx::Error> {
    Ok(TokenRecord::new(
        row.try_get("access_token")?,
        row.try_get("refresh_token")?,
        row.try_get("expires_at")?,
    ))
}

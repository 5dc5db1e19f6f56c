//! Durable storage for exactly one `TokenRecord`.
//!
//! Only full replace and full read are exposed, so a reader never observes a
//! record mixing fields from two refreshes.

use crate::cache::token::TokenRecord;
use crate::error::TokenError;

pub mod sqlite;

pub use sqlite::SqliteTokenStore;

pub trait TokenStore: Send + Sync {
    /// Ensure the underlying storage exists. Safe to call on every startup.
    fn initialize(&self) -> impl std::future::Future<Output = Result<(), TokenError>> + Send;

    /// Replace any existing record with `record` as one atomic unit.
    fn save(&self, record: &TokenRecord) -> impl std::future::Future<Output = Result<(), TokenError>> + Send;

    /// Current record, or `None` if nothing was ever saved.
    fn load(&self) -> impl std::future::Future<Output = Result<Option<TokenRecord>, TokenError>> + Send;
}

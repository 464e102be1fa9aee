//! Path-keyed document store.
//!
//! Records live at slash-separated paths (`serverStatus`, `members/{id}`,
//! `rules/{id}`, `users/{uid}`, `applications/{id}`) as JSON documents.
//! Every write is a full-record replacement with last-writer-wins
//! semantics: there is no version token and no merge of concurrent
//! changes. Writers observe their own writes echoed back through the
//! change feed like any other change.

mod repository;
mod seed;
mod sqlite;

#[cfg(test)]
pub mod memory;

pub use repository::Repository;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

/// Store path of the singleton server-status record.
pub const STATUS_PATH: &str = "serverStatus";

/// Prefix for member records.
pub const MEMBERS_PREFIX: &str = "members/";

/// Prefix for rule records.
pub const RULES_PREFIX: &str = "rules/";

/// Prefix for admin principal records.
pub const USERS_PREFIX: &str = "users/";

/// Prefix for join application records.
pub const APPLICATIONS_PREFIX: &str = "applications/";

/// A change pushed over the store's event feed.
///
/// `value` is `None` when the record at `path` was removed.
#[derive(Debug, Clone)]
pub struct StoreEvent {
    pub path: String,
    pub value: Option<Value>,
}

/// Errors surfaced by a document store.
#[derive(Debug)]
pub enum StoreError {
    /// The backing database rejected or failed the operation.
    Database(String),
    /// A stored document could not be encoded or decoded.
    Serialization(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(msg) => write!(f, "database: {}", msg),
            StoreError::Serialization(msg) => write!(f, "serialization: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Read/write/subscribe surface of the document store.
///
/// Change delivery is at-least-once with no ordering guarantee between
/// independent writers; subscribers must tolerate both.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the record at `path`, if any.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the record at `path` with `value` (full-record write).
    async fn put(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Delete the record at `path`. Removing an absent record is a no-op.
    async fn remove(&self, path: &str) -> Result<(), StoreError>;

    /// List all records whose path starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError>;

    /// Subscribe to the change feed. The receiver sees every subsequent
    /// write and removal, including the subscriber's own.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}

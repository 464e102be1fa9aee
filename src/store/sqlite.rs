//! SQLite-backed document store.
//!
//! SQLite is the source of truth; the change feed is a broadcast channel
//! fed after each committed write.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tokio::sync::broadcast;

use super::{DocumentStore, StoreError, StoreEvent};

/// Capacity of the change-feed channel. A subscriber that falls this far
/// behind sees a `Lagged` error and skips to the newest event.
const EVENT_CAPACITY: usize = 256;

/// Document store persisted to a single SQLite file.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    events: broadcast::Sender<StoreEvent>,
}

impl SqliteStore {
    /// Open (or create) the store at `db_path` and run migrations.
    pub async fn open(db_path: &Path) -> Result<Self, sqlx::Error> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        run_migrations(&pool).await?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self { pool, events })
    }
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            path TEXT PRIMARY KEY,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT body FROM documents WHERE path = ?")
            .bind(path)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let body: String = row.get("body");
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let body = serde_json::to_string(&value)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO documents (path, body, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(path) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at
            "#,
        )
        .bind(path)
        .bind(&body)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        // Receivers may not exist yet; a closed channel is not an error.
        let _ = self.events.send(StoreEvent {
            path: path.to_string(),
            value: Some(value),
        });

        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE path = ?")
            .bind(path)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            let _ = self.events.send(StoreEvent {
                path: path.to_string(),
                value: None,
            });
        }

        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let rows = sqlx::query(
            "SELECT path, body FROM documents WHERE path LIKE ? || '%' ORDER BY path",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let path: String = row.get("path");
            let body: String = row.get("body");
            records.push((path, serde_json::from_str(&body)?));
        }

        Ok(records)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn open_temp() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let store = SqliteStore::open(&dir.path().join("store.sqlite"))
            .await
            .expect("open store");
        (store, dir)
    }

    #[tokio::test]
    async fn put_get_roundtrip() {
        let (store, _dir) = open_temp().await;

        store
            .put("rules/abc", json!({"title": "No Griefing"}))
            .await
            .unwrap();

        let value = store.get("rules/abc").await.unwrap().unwrap();
        assert_eq!(value["title"], "No Griefing");
        assert!(store.get("rules/missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_is_full_record_replacement() {
        let (store, _dir) = open_temp().await;

        store
            .put("serverStatus", json!({"isOnline": true, "playerCount": 5}))
            .await
            .unwrap();
        store
            .put("serverStatus", json!({"isOnline": false}))
            .await
            .unwrap();

        let value = store.get("serverStatus").await.unwrap().unwrap();
        assert_eq!(value["isOnline"], false);
        // last-writer-wins: no merge of the earlier playerCount field
        assert!(value.get("playerCount").is_none());
    }

    #[tokio::test]
    async fn list_filters_by_prefix() {
        let (store, _dir) = open_temp().await;

        store.put("members/1", json!({"name": "a"})).await.unwrap();
        store.put("members/2", json!({"name": "b"})).await.unwrap();
        store.put("rules/1", json!({"title": "t"})).await.unwrap();

        let members = store.list("members/").await.unwrap();
        assert_eq!(members.len(), 2);
        let rules = store.list("rules/").await.unwrap();
        assert_eq!(rules.len(), 1);
    }

    #[tokio::test]
    async fn writes_reach_subscribers() {
        let (store, _dir) = open_temp().await;
        let mut feed = store.subscribe();

        store.put("members/1", json!({"name": "a"})).await.unwrap();
        let event = feed.recv().await.unwrap();
        assert_eq!(event.path, "members/1");
        assert!(event.value.is_some());

        store.remove("members/1").await.unwrap();
        let event = feed.recv().await.unwrap();
        assert_eq!(event.path, "members/1");
        assert!(event.value.is_none());
    }

    #[tokio::test]
    async fn remove_absent_is_silent_and_emits_nothing() {
        let (store, _dir) = open_temp().await;
        let mut feed = store.subscribe();

        store.remove("members/ghost").await.unwrap();

        // a marker write proves the feed stayed empty until now
        store.put("members/1", json!({"name": "a"})).await.unwrap();
        let event = feed.recv().await.unwrap();
        assert_eq!(event.path, "members/1");
    }
}

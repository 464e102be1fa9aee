//! Process-wide server-status synchronizer.
//!
//! `StatusSync` keeps one eventually-consistent cached copy of the
//! `serverStatus` record, seeded from local defaults when the store is
//! empty and kept live by a subscription to the store's change feed. It is
//! an explicit context object injected into handlers, constructed once at
//! startup and torn down by aborting its listener task.
//!
//! Conflict policy is last-writer-wins: writes are full-record
//! replacements with no version token, and a writer's own write comes back
//! through the change feed after an arbitrary delay like anyone else's.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::ServerStatus;
use crate::store::{DocumentStore, StoreEvent, STATUS_PATH};

pub struct StatusSync {
    store: Arc<dyn DocumentStore>,
    cache: watch::Sender<ServerStatus>,
    /// Set when a store failure forced a local-only update; cleared the
    /// next time a remote change lands.
    local_only: Arc<AtomicBool>,
    listener: JoinHandle<()>,
}

impl StatusSync {
    /// Construct the synchronizer: adopt the remote record if present,
    /// otherwise seed the store with local defaults (best-effort, no
    /// atomic check-and-set; two racing processes both write and the
    /// later write wins).
    pub async fn start(store: Arc<dyn DocumentStore>) -> Self {
        // Subscribe before the initial read so no change falls in the gap.
        let feed = store.subscribe();

        let seeded = ServerStatus::seed(Utc::now());
        let initial = match store.get(STATUS_PATH).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(status) => status,
                Err(err) => {
                    tracing::warn!("Stored server status is undecodable, using defaults: {}", err);
                    seeded
                }
            },
            Ok(None) => {
                match serde_json::to_value(&seeded) {
                    Ok(value) => {
                        if let Err(err) = store.put(STATUS_PATH, value).await {
                            tracing::warn!("Failed to seed server status: {}", err);
                        } else {
                            tracing::info!("Seeded server status with local defaults");
                        }
                    }
                    Err(err) => tracing::error!("Failed to encode seed status: {}", err),
                }
                seeded
            }
            Err(err) => {
                tracing::warn!("Server status unavailable, starting on local defaults: {}", err);
                seeded
            }
        };

        let (cache, _) = watch::channel(initial);
        let local_only = Arc::new(AtomicBool::new(false));

        let listener = tokio::spawn(listen(feed, cache.clone(), local_only.clone()));

        Self {
            store,
            cache,
            local_only,
            listener,
        }
    }

    /// The current cached snapshot. Instant, never fails.
    pub fn snapshot(&self) -> ServerStatus {
        self.cache.borrow().clone()
    }

    /// Whether the cache is running ahead of the store after a failed
    /// remote write.
    pub fn locally_authoritative(&self) -> bool {
        self.local_only.load(Ordering::SeqCst)
    }

    /// Flip the online flag.
    ///
    /// On a successful store write the cache is left untouched: the
    /// echoed change-feed event updates it, avoiding a race between the
    /// local write and the echo. On failure the cache is updated locally
    /// and marked locally authoritative until connectivity returns.
    pub async fn toggle_online(&self) -> ServerStatus {
        let current = self.snapshot();
        let next = current.with_online(!current.is_online, Utc::now());
        self.write_or_fall_back(next.clone()).await;
        next
    }

    /// Set the player count via a read-modify-write of the full record.
    ///
    /// Counts above capacity are stored verbatim (no clamping). The
    /// read-modify-write avoids clobbering concurrent field-level changes
    /// but still races with a concurrent full-record write.
    pub async fn set_player_count(&self, count: u32) -> ServerStatus {
        let base = match self.store.get(STATUS_PATH).await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|err| {
                tracing::warn!("Stored server status is undecodable: {}", err);
                self.snapshot()
            }),
            Ok(None) => self.snapshot(),
            Err(err) => {
                tracing::warn!("Failed to read server status, updating locally: {}", err);
                let next = self.snapshot().with_player_count(count, Utc::now());
                self.apply_local(next.clone());
                return next;
            }
        };

        let next = base.with_player_count(count, Utc::now());
        self.write_or_fall_back(next.clone()).await;
        next
    }

    /// Tear down the store subscription. Also runs on drop.
    pub fn shutdown(&self) {
        self.listener.abort();
    }

    async fn write_or_fall_back(&self, next: ServerStatus) {
        match serde_json::to_value(&next) {
            Ok(value) => {
                if let Err(err) = self.store.put(STATUS_PATH, value).await {
                    tracing::warn!("Failed to write server status, updating locally: {}", err);
                    self.apply_local(next);
                }
                // On success the subscription echo updates the cache.
            }
            Err(err) => {
                tracing::error!("Failed to encode server status: {}", err);
                self.apply_local(next);
            }
        }
    }

    fn apply_local(&self, next: ServerStatus) {
        self.local_only.store(true, Ordering::SeqCst);
        self.cache.send_replace(next);
    }
}

impl Drop for StatusSync {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Forward status changes from the store feed into the cache for the
/// synchronizer's whole lifetime.
async fn listen(
    mut feed: tokio::sync::broadcast::Receiver<StoreEvent>,
    cache: watch::Sender<ServerStatus>,
    local_only: Arc<AtomicBool>,
) {
    loop {
        match feed.recv().await {
            Ok(StoreEvent { path, value }) if path == STATUS_PATH => match value {
                Some(value) => match serde_json::from_value::<ServerStatus>(value) {
                    Ok(status) => {
                        local_only.store(false, Ordering::SeqCst);
                        cache.send_replace(status);
                    }
                    Err(err) => {
                        tracing::warn!("Ignoring undecodable status change: {}", err);
                    }
                },
                // The record is never deleted; keep the last-known value.
                None => {}
            },
            Ok(_) => {}
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Status feed lagged, skipped {} events", skipped);
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}

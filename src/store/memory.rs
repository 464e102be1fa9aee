//! In-memory document store for tests.
//!
//! Simulates the hosted store shared by several independent "tabs": each
//! tab gets its own synchronizer while all of them share one `MemoryStore`.
//! An optional echo delay defers change-feed delivery the way a remote
//! round-trip would, so a writer sees its own write echoed back late.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use super::{DocumentStore, StoreError, StoreEvent};

pub struct MemoryStore {
    records: Mutex<BTreeMap<String, Value>>,
    events: broadcast::Sender<StoreEvent>,
    echo_delay: Option<Duration>,
    fail_writes: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_echo_delay(None)
    }

    pub fn with_echo_delay(echo_delay: Option<Duration>) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            records: Mutex::new(BTreeMap::new()),
            events,
            echo_delay,
            fail_writes: Mutex::new(false),
        }
    }

    /// Make subsequent reads and writes fail, simulating an unreachable
    /// remote store.
    pub fn set_unreachable(&self, unreachable: bool) {
        *self.fail_writes.lock().unwrap() = unreachable;
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if *self.fail_writes.lock().unwrap() {
            Err(StoreError::Database("store unreachable".to_string()))
        } else {
            Ok(())
        }
    }

    fn emit(&self, event: StoreEvent) {
        match self.echo_delay {
            Some(delay) => {
                let sender = self.events.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = sender.send(event);
                });
            }
            None => {
                let _ = self.events.send(event);
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.check_reachable()?;
        Ok(self.records.lock().unwrap().get(path).cloned())
    }

    async fn put(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.check_reachable()?;
        self.records
            .lock()
            .unwrap()
            .insert(path.to_string(), value.clone());
        self.emit(StoreEvent {
            path: path.to_string(),
            value: Some(value),
        });
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.check_reachable()?;
        let removed = self.records.lock().unwrap().remove(path).is_some();
        if removed {
            self.emit(StoreEvent {
                path: path.to_string(),
                value: None,
            });
        }
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError> {
        self.check_reachable()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .range(prefix.to_string()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .map(|(path, value)| (path.clone(), value.clone()))
            .collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

//! In-process [`StateStore`] backed by a mutex-guarded map.
//!
//! Values are held in their encoded string form so second-resolution
//! behaviour matches the durable backends.

use std::collections::HashMap;

use async_trait::async_trait;
use millguard_core::types::Timestamp;
use tokio::sync::Mutex;

use crate::store::{decode_timestamp, encode_timestamp, StateKey, StateStore, StoreError};

/// Shared in-memory state. Compare-and-set holds the lock across the
/// read and the write, so it is atomic per key.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.values.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.lock().await.is_empty()
    }

    /// Raw encoded value under `key`, as a durable backend would hold it.
    pub async fn raw(&self, key: &StateKey) -> Option<String> {
        self.values.lock().await.get(&key.to_string()).cloned()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, key: &StateKey) -> Result<Option<Timestamp>, StoreError> {
        let values = self.values.lock().await;
        values
            .get(&key.to_string())
            .map(|raw| decode_timestamp(key, raw))
            .transpose()
    }

    async fn compare_and_set(
        &self,
        key: &StateKey,
        expected: Option<Timestamp>,
        new: Timestamp,
    ) -> Result<bool, StoreError> {
        let mut values = self.values.lock().await;
        let name = key.to_string();
        let expected = expected.map(encode_timestamp);

        if values.get(&name) != expected.as_ref() {
            return Ok(false);
        }
        values.insert(name, encode_timestamp(new));
        Ok(true)
    }

    async fn put(&self, key: &StateKey, value: Timestamp) -> Result<(), StoreError> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), encode_timestamp(value));
        Ok(())
    }

    async fn remove(&self, key: &StateKey) -> Result<(), StoreError> {
        self.values.lock().await.remove(&key.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

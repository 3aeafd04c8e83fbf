//! Two-part-key store seam.
//!
//! Every entity maps to one item addressed by a (partition, sort) key pair,
//! mirroring the managed key-value service the production deployment uses.
//! The trait abstracts the backend so the routing engine runs against an
//! in-memory store in tests and the managed service in production. Items may
//! carry a store-enforced expiry attribute: an expired item is absent to
//! readers without an explicit delete.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{CoreError, Result};
use crate::types::now_unix;

/// Asynchronous two-part-key item store.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get an item. Returns None if absent or past its expiry.
    async fn get(&self, pk: &str, sk: &str) -> Result<Option<Vec<u8>>>;

    /// Upsert an item, overwriting any existing value for the key pair.
    /// `expires_at` (Unix seconds) marks the item absent once reached.
    async fn put(&self, pk: &str, sk: &str, value: Vec<u8>, expires_at: Option<u64>) -> Result<()>;

    /// Delete an item. Ok even if the item did not exist.
    async fn delete(&self, pk: &str, sk: &str) -> Result<()>;
}

struct Item {
    value: Vec<u8>,
    expires_at: Option<u64>,
}

impl Item {
    fn is_expired(&self, now: u64) -> bool {
        matches!(self.expires_at, Some(at) if now >= at)
    }
}

/// In-memory store backed by a HashMap. Thread-safe via RwLock. Honors the
/// expiry attribute on read; expired items are purged lazily.
pub struct MemoryKvStore {
    items: RwLock<HashMap<(String, String), Item>>,
}

impl MemoryKvStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of one partition's live items as (sort key, value) pairs.
    /// Expired items are excluded. Inspection helper for tests and
    /// diagnostics; the [`KvStore`] seam itself stays get/put/delete.
    pub fn snapshot_partition(&self, pk: &str) -> Vec<(String, Vec<u8>)> {
        let now = now_unix();
        let items = self.items.read().expect("kv store lock poisoned");
        items
            .iter()
            .filter(|((p, _), item)| p == pk && !item.is_expired(now))
            .map(|((_, s), item)| (s.clone(), item.value.clone()))
            .collect()
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, pk: &str, sk: &str) -> Result<Option<Vec<u8>>> {
        let key = (pk.to_string(), sk.to_string());
        let now = now_unix();

        let expired = {
            let items = self
                .items
                .read()
                .map_err(|e| CoreError::Storage(e.to_string()))?;
            match items.get(&key) {
                Some(item) if item.is_expired(now) => true,
                Some(item) => return Ok(Some(item.value.clone())),
                None => return Ok(None),
            }
        };

        if expired {
            let mut items = self
                .items
                .write()
                .map_err(|e| CoreError::Storage(e.to_string()))?;
            if items.get(&key).is_some_and(|item| item.is_expired(now)) {
                items.remove(&key);
            }
        }
        Ok(None)
    }

    async fn put(&self, pk: &str, sk: &str, value: Vec<u8>, expires_at: Option<u64>) -> Result<()> {
        let mut items = self
            .items
            .write()
            .map_err(|e| CoreError::Storage(e.to_string()))?;
        items.insert(
            (pk.to_string(), sk.to_string()),
            Item { value, expires_at },
        );
        Ok(())
    }

    async fn delete(&self, pk: &str, sk: &str) -> Result<()> {
        let mut items = self
            .items
            .write()
            .map_err(|e| CoreError::Storage(e.to_string()))?;
        items.remove(&(pk.to_string(), sk.to_string()));
        Ok(())
    }
}

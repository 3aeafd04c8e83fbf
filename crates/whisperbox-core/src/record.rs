//! Durable confession records.
//!
//! Append-only: one item per published confession, partition key
//! `DEST#<destination>`, sort key `CONFESSION#<created_at>#<confession id>`.
//! The sort key keeps a destination's records in publication order and can
//! never collide because confession IDs are never reused. The routing core
//! only appends; status transitions happen elsewhere.

use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::kvstore::KvStore;
use crate::types::ConfessionRecord;

fn pk(record: &ConfessionRecord) -> String {
    format!("DEST#{}", record.destination_id.as_str())
}

fn sk(record: &ConfessionRecord) -> String {
    format!(
        "CONFESSION#{}#{}",
        record.created_at,
        record.confession_id.as_str()
    )
}

/// Append-only store of published confessions.
#[derive(Clone)]
pub struct ConfessionRecordStore {
    kv: Arc<dyn KvStore>,
}

impl ConfessionRecordStore {
    /// Creates a store over the given key-value backend.
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Durably appends one record. Called only after a successful publish.
    pub async fn append(&self, record: &ConfessionRecord) -> Result<()> {
        let bytes = serde_json::to_vec(record).map_err(|e| CoreError::Storage(e.to_string()))?;
        self.kv.put(&pk(record), &sk(record), bytes, None).await
    }
}

//! Per-destination routing configuration.
//!
//! One item per destination, partition key `DEST#<id>`, sort key `CONFIG`.
//! Administrator-driven, last-writer-wins; the routing engine only reads.

use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::kvstore::KvStore;
use crate::types::{ChannelId, Destination, DestinationId};

const SK_CONFIG: &str = "CONFIG";

fn pk(id: &DestinationId) -> String {
    format!("DEST#{}", id.as_str())
}

/// Read/write access to destination routing configuration.
#[derive(Clone)]
pub struct DestinationConfigStore {
    kv: Arc<dyn KvStore>,
}

impl DestinationConfigStore {
    /// Creates a store over the given key-value backend.
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Idempotent upsert: point the destination at a channel and enable
    /// routing. At most one active target channel per destination; a second
    /// call overwrites, it does not version.
    pub async fn set_destination(
        &self,
        id: &DestinationId,
        channel_id: &ChannelId,
        now: u64,
    ) -> Result<()> {
        let dest = Destination {
            id: id.clone(),
            channel_id: channel_id.clone(),
            enabled: true,
            updated_at: now,
        };
        self.write(&dest).await?;
        tracing::info!("destination {} routed to channel {}", id, channel_id);
        Ok(())
    }

    /// Turns routing off for a destination while keeping its configuration.
    /// No-op if the destination was never configured.
    pub async fn disable_destination(&self, id: &DestinationId, now: u64) -> Result<()> {
        let Some(mut dest) = self.get_destination(id).await? else {
            return Ok(());
        };
        dest.enabled = false;
        dest.updated_at = now;
        self.write(&dest).await?;
        tracing::info!("destination {} disabled", id);
        Ok(())
    }

    /// Reads a destination's configuration. None means routing was never
    /// configured for it.
    pub async fn get_destination(&self, id: &DestinationId) -> Result<Option<Destination>> {
        match self.kv.get(&pk(id), SK_CONFIG).await? {
            Some(bytes) => {
                let dest = serde_json::from_slice(&bytes)
                    .map_err(|e| CoreError::Storage(e.to_string()))?;
                Ok(Some(dest))
            }
            None => Ok(None),
        }
    }

    /// Reads a destination and returns it only if routing is enabled.
    pub async fn get_enabled(&self, id: &DestinationId) -> Result<Option<Destination>> {
        Ok(self.get_destination(id).await?.filter(|d| d.enabled))
    }

    async fn write(&self, dest: &Destination) -> Result<()> {
        let bytes = serde_json::to_vec(dest).map_err(|e| CoreError::Storage(e.to_string()))?;
        self.kv.put(&pk(&dest.id), SK_CONFIG, bytes, None).await
    }
}

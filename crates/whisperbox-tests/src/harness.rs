//! Shared test backend: in-memory stores plus scripted collaborator doubles.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use whisperbox_core::{
    ChannelId, ConfessionRecord, CoreError, DeliveryHandle, DestinationId, Directory,
    FormattedConfession, KvStore, Membership, MemoryKvStore, Publisher, Result as CoreResult,
    RoutingEngine,
};

/// Directory double with a fixed membership table. Enumeration order is the
/// insertion order of `member` calls, standing in for the membership
/// source's natural order.
pub struct StubDirectory {
    rows: Vec<(String, Membership)>,
}

impl StubDirectory {
    /// Creates a directory from (identity, membership) rows.
    pub fn with_rows(rows: Vec<(String, Membership)>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl Directory for StubDirectory {
    async fn memberships(&self, raw_identity: &str) -> CoreResult<Vec<Membership>> {
        Ok(self
            .rows
            .iter()
            .filter(|(identity, _)| identity == raw_identity)
            .map(|(_, membership)| membership.clone())
            .collect())
    }
}

/// Publisher double that records every delivery and can be switched to fail.
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(ChannelId, FormattedConfession)>>,
    fail: AtomicBool,
}

impl RecordingPublisher {
    /// All deliveries so far, in order.
    pub fn published(&self) -> Vec<(ChannelId, FormattedConfession)> {
        self.published.lock().unwrap().clone()
    }

    /// Number of deliveries so far.
    pub fn published_count(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    /// Makes every subsequent publish fail with a gateway error.
    pub fn fail_next_publishes(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(
        &self,
        channel: &ChannelId,
        message: &FormattedConfession,
    ) -> CoreResult<DeliveryHandle> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CoreError::Publish("gateway unavailable".to_string()));
        }
        let mut published = self.published.lock().unwrap();
        published.push((channel.clone(), message.clone()));
        Ok(DeliveryHandle(format!("msg-{}", published.len())))
    }
}

/// Key-value double delegating to [`MemoryKvStore`] until switched to fail.
pub struct FlakyKvStore {
    inner: MemoryKvStore,
    fail: AtomicBool,
}

impl FlakyKvStore {
    /// Creates a working store.
    pub fn new() -> Self {
        Self {
            inner: MemoryKvStore::new(),
            fail: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent operation fail with a storage error.
    pub fn fail_next_ops(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> CoreResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(CoreError::Storage("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for FlakyKvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for FlakyKvStore {
    async fn get(&self, pk: &str, sk: &str) -> CoreResult<Option<Vec<u8>>> {
        self.check()?;
        self.inner.get(pk, sk).await
    }

    async fn put(
        &self,
        pk: &str,
        sk: &str,
        value: Vec<u8>,
        expires_at: Option<u64>,
    ) -> CoreResult<()> {
        self.check()?;
        self.inner.put(pk, sk, value, expires_at).await
    }

    async fn delete(&self, pk: &str, sk: &str) -> CoreResult<()> {
        self.check()?;
        self.inner.delete(pk, sk).await
    }
}

/// Builder for a fully wired engine over in-memory collaborators.
pub struct BackendBuilder {
    rows: Vec<(String, Membership)>,
    destinations: Vec<(DestinationId, ChannelId)>,
    disabled: Vec<DestinationId>,
}

impl BackendBuilder {
    /// Declares `identity` a member of `destination`.
    pub fn member(mut self, identity: &str, destination: &str, display_name: &str) -> Self {
        self.rows.push((
            identity.to_string(),
            Membership {
                destination_id: DestinationId::new(destination),
                display_name: display_name.to_string(),
            },
        ));
        self
    }

    /// Configures a destination's confession channel (routing enabled).
    pub fn destination(mut self, destination: &str, channel: &str) -> Self {
        self.destinations
            .push((DestinationId::new(destination), ChannelId::new(channel)));
        self
    }

    /// Disables a previously configured destination.
    pub fn disabled(mut self, destination: &str) -> Self {
        self.disabled.push(DestinationId::new(destination));
        self
    }

    /// Wires the engine and applies the declared configuration.
    pub async fn build(self) -> TestBackend {
        let kv = Arc::new(MemoryKvStore::new());
        let publisher = Arc::new(RecordingPublisher::default());
        let engine = Arc::new(RoutingEngine::new(
            kv.clone(),
            publisher.clone(),
            Arc::new(StubDirectory { rows: self.rows }),
        ));

        let now = whisperbox_core::now_unix();
        for (destination, channel) in &self.destinations {
            engine
                .destinations()
                .set_destination(destination, channel, now)
                .await
                .expect("destination setup");
        }
        for destination in &self.disabled {
            engine
                .destinations()
                .disable_destination(destination, now)
                .await
                .expect("destination disable");
        }

        TestBackend {
            kv,
            publisher,
            engine,
        }
    }
}

/// A wired engine plus handles to inspect its collaborators.
pub struct TestBackend {
    /// Backing key-value store.
    pub kv: Arc<MemoryKvStore>,
    /// Publisher double.
    pub publisher: Arc<RecordingPublisher>,
    /// Engine under test.
    pub engine: Arc<RoutingEngine>,
}

impl TestBackend {
    /// Starts an empty backend builder.
    pub fn builder() -> BackendBuilder {
        BackendBuilder {
            rows: Vec::new(),
            destinations: Vec::new(),
            disabled: Vec::new(),
        }
    }

    /// Confession records appended for a destination, in sort-key order.
    pub fn records(&self, destination: &str) -> Vec<ConfessionRecord> {
        let mut items: Vec<(String, Vec<u8>)> = self
            .kv
            .snapshot_partition(&format!("DEST#{}", destination))
            .into_iter()
            .filter(|(sk, _)| sk.starts_with("CONFESSION#"))
            .collect();
        items.sort_by(|a, b| a.0.cmp(&b.0));
        items
            .into_iter()
            .map(|(_, bytes)| serde_json::from_slice(&bytes).expect("record decodes"))
            .collect()
    }

    /// Number of confession records appended for a destination.
    pub fn record_count(&self, destination: &str) -> usize {
        self.records(destination).len()
    }
}

//! Ephemeral pending-selection storage.
//!
//! One unresolved disambiguation session per identity token, partition key
//! `PENDING#<token>`, sort key `SELECTION`, store-enforced expiry. A put for
//! a token that already has a live session overwrites it: a new submission
//! supersedes the prior pending confession.

use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::identity::IdentityToken;
use crate::kvstore::KvStore;
use crate::types::PendingSelection;

/// Seconds a pending selection stays resolvable.
pub const SELECTION_TTL_SECS: u64 = 300;

const SK_SELECTION: &str = "SELECTION";

fn pk(token: &IdentityToken) -> String {
    format!("PENDING#{}", token.as_str())
}

/// TTL-bound storage for in-flight disambiguation sessions.
#[derive(Clone)]
pub struct PendingSelectionStore {
    kv: Arc<dyn KvStore>,
}

impl PendingSelectionStore {
    /// Creates a store over the given key-value backend.
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Writes a session, overwriting any live session for the same token.
    /// The item expires at `selection.expires_at`.
    pub async fn put(&self, selection: &PendingSelection) -> Result<()> {
        let bytes =
            serde_json::to_vec(selection).map_err(|e| CoreError::Storage(e.to_string()))?;
        self.kv
            .put(
                &pk(&selection.identity_token),
                SK_SELECTION,
                bytes,
                Some(selection.expires_at),
            )
            .await
    }

    /// Reads the live session for a token. None if absent or expired.
    pub async fn get(&self, token: &IdentityToken) -> Result<Option<PendingSelection>> {
        match self.kv.get(&pk(token), SK_SELECTION).await? {
            Some(bytes) => {
                let selection = serde_json::from_slice(&bytes)
                    .map_err(|e| CoreError::Storage(e.to_string()))?;
                Ok(Some(selection))
            }
            None => Ok(None),
        }
    }

    /// Deletes the session for a token, if any.
    pub async fn delete(&self, token: &IdentityToken) -> Result<()> {
        self.kv.delete(&pk(token), SK_SELECTION).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityHasher;
    use crate::kvstore::MemoryKvStore;
    use crate::types::{now_unix, CandidateDestination, DestinationId};

    fn selection(token: &IdentityToken, body: &str, created_at: u64) -> PendingSelection {
        PendingSelection {
            identity_token: token.clone(),
            body: body.to_string(),
            attachments: vec![],
            candidates: vec![
                CandidateDestination {
                    id: DestinationId::new("d1"),
                    display_name: "One".to_string(),
                },
                CandidateDestination {
                    id: DestinationId::new("d2"),
                    display_name: "Two".to_string(),
                },
            ],
            created_at,
            expires_at: created_at + SELECTION_TTL_SECS,
        }
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = PendingSelectionStore::new(Arc::new(MemoryKvStore::new()));
        let token = IdentityHasher::token("u1");
        let sel = selection(&token, "hello", now_unix());

        store.put(&sel).await.unwrap();
        assert_eq!(store.get(&token).await.unwrap(), Some(sel));

        store.delete(&token).await.unwrap();
        assert_eq!(store.get(&token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_overwrites_prior_session() {
        let store = PendingSelectionStore::new(Arc::new(MemoryKvStore::new()));
        let token = IdentityHasher::token("u1");
        let now = now_unix();

        store.put(&selection(&token, "first", now)).await.unwrap();
        store.put(&selection(&token, "second", now)).await.unwrap();

        let live = store.get(&token).await.unwrap().unwrap();
        assert_eq!(live.body, "second");
    }

    #[tokio::test]
    async fn test_expired_session_is_absent() {
        let store = PendingSelectionStore::new(Arc::new(MemoryKvStore::new()));
        let token = IdentityHasher::token("u1");
        // created_at far enough back that expires_at is already past
        let sel = selection(&token, "old", now_unix() - SELECTION_TTL_SECS - 1);

        store.put(&sel).await.unwrap();
        assert_eq!(store.get(&token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sessions_are_per_token() {
        let store = PendingSelectionStore::new(Arc::new(MemoryKvStore::new()));
        let t1 = IdentityHasher::token("u1");
        let t2 = IdentityHasher::token("u2");
        let now = now_unix();

        store.put(&selection(&t1, "mine", now)).await.unwrap();
        assert_eq!(store.get(&t2).await.unwrap(), None);
        store.delete(&t2).await.unwrap();
        assert!(store.get(&t1).await.unwrap().is_some());
    }
}

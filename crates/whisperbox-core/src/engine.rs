//! The pending-selection routing state machine.
//!
//! Per identity token the engine moves through
//! `IDLE -> AWAITING_SELECTION -> (RESOLVED | EXPIRED | ABANDONED) -> IDLE`.
//! A submission either publishes immediately (zero or one eligible
//! destination) or parks the confession in a TTL-bound pending selection; a
//! later selection event resolves that state exactly once and drives the
//! shared publish step. Exactly one publish results from one valid
//! resolution: events for the same identity token are serialized on a
//! per-token mutex, and a resolution that finds the pending state already
//! gone reports expiry instead of publishing again.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::destination::DestinationConfigStore;
use crate::directory::Directory;
use crate::error::{CoreError, Result};
use crate::identity::{IdentityHasher, IdentityToken};
use crate::kvstore::KvStore;
use crate::pending::{PendingSelectionStore, SELECTION_TTL_SECS};
use crate::publisher::{format_confession, Publisher};
use crate::record::ConfessionRecordStore;
use crate::types::{
    CandidateDestination, ConfessionId, ConfessionRecord, ConfessionStatus, DestinationId,
    PendingSelection,
};

/// A selection reply, in either addressing scheme. Both resolve against the
/// same ordered candidate list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Free-text numeric reply; must parse to a 1-based position.
    Numeric(String),
    /// Direct-selection interaction carrying a candidate's stable token.
    Token(String),
}

impl Selection {
    /// Maps this selection to an index into the candidate list, or None if
    /// it addresses no candidate. Numeric values must parse as an integer in
    /// `1..=len`; tokens must match exactly one candidate's stable token.
    pub fn candidate_index(&self, candidates: &[CandidateDestination]) -> Option<usize> {
        match self {
            Selection::Numeric(text) => {
                let position: usize = text.trim().parse().ok()?;
                if (1..=candidates.len()).contains(&position) {
                    Some(position - 1)
                } else {
                    None
                }
            }
            Selection::Token(token) => {
                candidates.iter().position(|c| c.select_token() == token)
            }
        }
    }

    fn as_text(&self) -> String {
        match self {
            Selection::Numeric(text) => text.trim().to_string(),
            Selection::Token(token) => token.clone(),
        }
    }
}

/// Outcome of a submission or resolution event, as reported to the
/// submitter. Carries no internal identifiers beyond the short display ID.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The confession was published.
    Posted {
        /// Destination it was published to.
        destination_id: DestinationId,
        /// Short display ID shown in the confirmation.
        short_display_id: String,
    },
    /// More than one destination qualified; a disambiguation prompt is due.
    SelectionPending {
        /// Ordered candidates, 1-based positions valid for numeric replies.
        candidates: Vec<CandidateDestination>,
    },
}

/// The routing state machine. All collaborators are injected; the engine
/// holds no gateway or store client of its own.
pub struct RoutingEngine {
    destinations: DestinationConfigStore,
    pending: PendingSelectionStore,
    records: ConfessionRecordStore,
    publisher: Arc<dyn Publisher>,
    directory: Arc<dyn Directory>,
    token_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RoutingEngine {
    /// Builds an engine whose stores share one key-value backend.
    pub fn new(
        kv: Arc<dyn KvStore>,
        publisher: Arc<dyn Publisher>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            destinations: DestinationConfigStore::new(kv.clone()),
            pending: PendingSelectionStore::new(kv.clone()),
            records: ConfessionRecordStore::new(kv),
            publisher,
            directory,
            token_locks: DashMap::new(),
        }
    }

    /// The destination configuration store this engine reads.
    pub fn destinations(&self) -> &DestinationConfigStore {
        &self.destinations
    }

    /// True if the identity has a live pending selection. Used by the
    /// dispatcher to tell a selection reply from a fresh submission.
    pub async fn has_pending(&self, raw_identity: &str) -> Result<bool> {
        let token = IdentityHasher::token(raw_identity);
        Ok(self.pending.get(&token).await?.is_some())
    }

    /// Handles a confession submission.
    ///
    /// Zero eligible destinations is an error; one publishes immediately;
    /// two or more park the confession in a pending selection with a fixed
    /// 300 second TTL, superseding any prior pending confession for the
    /// same identity.
    pub async fn submit(
        &self,
        raw_identity: &str,
        body: &str,
        attachments: Vec<String>,
        now: u64,
    ) -> Result<SubmitOutcome> {
        let body = body.trim();
        if body.is_empty() {
            return Err(CoreError::EmptyMessage);
        }

        let token = IdentityHasher::token(raw_identity);
        let lock = self.lock_for(&token);
        let _guard = lock.lock().await;

        let candidates = self.eligible_candidates(raw_identity).await?;
        match candidates.len() {
            0 => Err(CoreError::NoDestination),
            1 => {
                let chosen = candidates[0].id.clone();
                self.publish_confession(&token, &chosen, body, &attachments, now)
                    .await
            }
            _ => {
                let selection = PendingSelection {
                    identity_token: token.clone(),
                    body: body.to_string(),
                    attachments,
                    candidates: candidates.clone(),
                    created_at: now,
                    expires_at: now + SELECTION_TTL_SECS,
                };
                self.pending.put(&selection).await?;
                tracing::info!(
                    "pending selection for {} with {} candidates",
                    token,
                    candidates.len()
                );
                Ok(SubmitOutcome::SelectionPending { candidates })
            }
        }
    }

    /// Resolves a selection reply against the identity's pending selection.
    ///
    /// An absent pending selection reports expiry, which is also how the
    /// loser of a double-resolution race no-ops. An invalid selection leaves
    /// the pending state intact so the identity can retry within the TTL.
    /// A valid selection publishes, then deletes the pending state whether
    /// the publish succeeded or not.
    pub async fn resolve(
        &self,
        raw_identity: &str,
        selection: Selection,
        now: u64,
    ) -> Result<SubmitOutcome> {
        let token = IdentityHasher::token(raw_identity);
        let lock = self.lock_for(&token);
        let _guard = lock.lock().await;

        let Some(pending) = self.pending.get(&token).await? else {
            return Err(CoreError::SelectionExpired);
        };

        let index = match selection.candidate_index(&pending.candidates) {
            Some(index) => index,
            None => {
                tracing::debug!("invalid selection from {}, state kept", token);
                return Err(CoreError::InvalidSelection {
                    given: selection.as_text(),
                    max: pending.candidates.len(),
                });
            }
        };

        let chosen = pending.candidates[index].id.clone();
        let outcome = self
            .publish_confession(&token, &chosen, &pending.body, &pending.attachments, now)
            .await;

        // Deleted on success and on publish failure alike; a stuck pending
        // selection would re-prompt the user forever.
        if let Err(e) = self.pending.delete(&token).await {
            tracing::warn!("failed to delete pending selection for {}: {}", token, e);
        }

        outcome
    }

    /// Shared publish step for the single-candidate and resolved
    /// multi-candidate paths. Re-fetches the destination configuration so a
    /// channel change between enumeration and publish is honored.
    async fn publish_confession(
        &self,
        token: &IdentityToken,
        destination_id: &DestinationId,
        body: &str,
        attachments: &[String],
        now: u64,
    ) -> Result<SubmitOutcome> {
        let Some(dest) = self.destinations.get_enabled(destination_id).await? else {
            return Err(CoreError::NoDestination);
        };

        let confession_id = ConfessionId::generate();
        let short_display_id = confession_id.short_display();
        let message = format_confession(body, attachments, &short_display_id, token.anon_tag());

        let handle = self.publisher.publish(&dest.channel_id, &message).await?;
        tracing::debug!("delivered {} as {}", short_display_id, handle.0);

        let record = ConfessionRecord {
            destination_id: destination_id.clone(),
            channel_id: dest.channel_id.clone(),
            confession_id,
            short_display_id: short_display_id.clone(),
            identity_token: token.clone(),
            body: body.to_string(),
            status: ConfessionStatus::Active,
            created_at: now,
        };
        if let Err(e) = self.records.append(&record).await {
            tracing::warn!("record append failed for {} after publish: {}", token, e);
            return Err(e);
        }

        tracing::info!(
            "confession {} published to {} for {}",
            short_display_id,
            destination_id,
            token
        );
        Ok(SubmitOutcome::Posted {
            destination_id: destination_id.clone(),
            short_display_id,
        })
    }

    async fn eligible_candidates(&self, raw_identity: &str) -> Result<Vec<CandidateDestination>> {
        let memberships = self.directory.memberships(raw_identity).await?;
        let mut candidates = Vec::new();
        // Membership order is preserved verbatim; positions handed to the
        // user must keep meaning the same candidates later.
        for membership in memberships {
            if self
                .destinations
                .get_enabled(&membership.destination_id)
                .await?
                .is_some()
            {
                candidates.push(CandidateDestination {
                    id: membership.destination_id,
                    display_name: membership.display_name,
                });
            }
        }
        Ok(candidates)
    }

    fn lock_for(&self, token: &IdentityToken) -> Arc<Mutex<()>> {
        self.token_locks
            .entry(token.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#![warn(missing_docs)]

//! Whisperbox core: anonymous confession routing.
//!
//! Private submissions are hashed to an identity token, matched against the
//! destinations that recognize the submitter, and either published straight
//! to the single eligible destination or parked behind a TTL-bound
//! disambiguation step. Everything stateful lives here; the chat gateway and
//! the managed key-value service stay behind the [`Publisher`], [`Directory`]
//! and [`KvStore`] seams.

pub mod destination;
pub mod directory;
pub mod engine;
pub mod error;
pub mod identity;
pub mod kvstore;
pub mod pending;
pub mod publisher;
pub mod record;
pub mod types;

pub use destination::DestinationConfigStore;
pub use directory::{Directory, Membership};
pub use engine::{RoutingEngine, Selection, SubmitOutcome};
pub use error::{CoreError, Result};
pub use identity::{IdentityHasher, IdentityToken};
pub use kvstore::{KvStore, MemoryKvStore};
pub use pending::{PendingSelectionStore, SELECTION_TTL_SECS};
pub use publisher::{format_confession, DeliveryHandle, FormattedConfession, Publisher};
pub use record::ConfessionRecordStore;
pub use types::{
    now_unix, CandidateDestination, ChannelId, ConfessionId, ConfessionRecord, ConfessionStatus,
    Destination, DestinationId, PendingSelection,
};

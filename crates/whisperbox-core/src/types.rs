//! Domain types for confession routing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one routing destination (a community).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DestinationId(String);

impl DestinationId {
    /// Creates a new DestinationId from a raw string.
    pub fn new(id: &str) -> Self {
        DestinationId(id.to_string())
    }

    /// Returns the raw string value of this destination ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies the public channel a destination publishes to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(String);

impl ChannelId {
    /// Creates a new ChannelId from a raw string.
    pub fn new(id: &str) -> Self {
        ChannelId(id.to_string())
    }

    /// Returns the raw string value of this channel ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique identifier of a published confession (UUID text).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfessionId(String);

impl ConfessionId {
    /// Generates a fresh, never-reused confession ID.
    pub fn generate() -> Self {
        ConfessionId(uuid::Uuid::new_v4().to_string())
    }

    /// Creates a ConfessionId from an existing string (for deserialized records).
    pub fn from_string(id: String) -> Self {
        ConfessionId(id)
    }

    /// Returns the raw string value of this confession ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short, human-presentable derivative of the ID. Collision-unlikely
    /// within one destination's visible history; not a key.
    pub fn short_display(&self) -> String {
        self.0.chars().take(8).collect()
    }
}

impl fmt::Display for ConfessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One configured routing target. Read-only to the routing engine;
/// written by destination-scoped administrative actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Destination this configuration belongs to.
    pub id: DestinationId,
    /// Channel confessions are published to.
    pub channel_id: ChannelId,
    /// Whether routing to this destination is currently enabled.
    pub enabled: bool,
    /// Unix seconds of the last configuration write.
    pub updated_at: u64,
}

/// One entry in a disambiguation candidate list. Positions are 1-based in
/// the user-facing prompt; `select_token` is the stable direct-selection
/// alternative to a numeric reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDestination {
    /// Destination the candidate refers to.
    pub id: DestinationId,
    /// Name shown to the user in the disambiguation prompt.
    pub display_name: String,
}

impl CandidateDestination {
    /// Stable per-candidate selection token. Both addressing schemes
    /// (numeric position, token) resolve to the same list entry.
    pub fn select_token(&self) -> &str {
        self.id.as_str()
    }
}

/// Status of a published confession. The retraction transition itself is
/// handled outside the routing core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfessionStatus {
    /// Published and visible.
    Active,
    /// Retracted after publication.
    Retracted,
}

/// Durable, append-only record of a successfully published confession.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfessionRecord {
    /// Destination the confession was published to.
    pub destination_id: DestinationId,
    /// Channel the confession was delivered to.
    pub channel_id: ChannelId,
    /// Globally unique confession identifier.
    pub confession_id: ConfessionId,
    /// Short display form of the confession ID.
    pub short_display_id: String,
    /// Hashed submitter identity. Never the raw identity.
    pub identity_token: crate::identity::IdentityToken,
    /// Confession body as published.
    pub body: String,
    /// Record status.
    pub status: ConfessionStatus,
    /// Unix seconds of publication.
    pub created_at: u64,
}

/// Ephemeral disambiguation session, at most one per identity token.
/// `candidates` is fixed at creation and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSelection {
    /// Hashed submitter identity that owns this session.
    pub identity_token: crate::identity::IdentityToken,
    /// Confession body held until the destination is chosen.
    pub body: String,
    /// Attachment URLs held until the destination is chosen.
    pub attachments: Vec<String>,
    /// Ordered candidate list, in the membership source's enumeration order.
    pub candidates: Vec<CandidateDestination>,
    /// Unix seconds of creation.
    pub created_at: u64,
    /// Unix seconds after which the session is unreadable.
    pub expires_at: u64,
}

/// Returns the current time as seconds since the Unix epoch.
pub fn now_unix() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time before epoch")
        .as_secs()
}

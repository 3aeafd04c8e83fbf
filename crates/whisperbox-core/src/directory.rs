//! Membership source seam.
//!
//! Answers "which destinations recognize this identity as a member", in the
//! source's natural enumeration order. That order is preserved verbatim into
//! candidate lists so numeric selection stays positionally valid.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::DestinationId;

/// One destination the identity is a recognized member of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Membership {
    /// The destination.
    pub destination_id: DestinationId,
    /// Human-readable destination name for prompts.
    pub display_name: String,
}

/// Enumerates destination memberships for a raw identity.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Lists the destinations that recognize `raw_identity` as a member,
    /// in the membership source's natural order.
    async fn memberships(&self, raw_identity: &str) -> Result<Vec<Membership>>;
}

//! Outbound publishing seam and message formatting.
//!
//! The gateway client library stays behind [`Publisher`]: the engine hands it
//! a fully formatted confession and a channel, and treats any error as
//! terminal for that attempt. No retries happen on this side of the seam.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ChannelId;

/// Opaque handle to a delivered message, as returned by the gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryHandle(pub String);

/// Embed-shaped confession payload as delivered to a destination channel.
/// Carries nothing that could deanonymize the submitter: the footer holds
/// only the short display ID and the anonymous tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedConfession {
    /// Embed title.
    pub title: String,
    /// Confession body.
    pub body: String,
    /// First attachment, shown as the embed image.
    pub image_url: Option<String>,
    /// Footer line with short display ID and anonymous author tag.
    pub footer: String,
}

/// Formats a confession for delivery. The first attachment becomes the
/// visual element; further attachments are dropped.
pub fn format_confession(
    body: &str,
    attachments: &[String],
    short_display_id: &str,
    anon_tag: &str,
) -> FormattedConfession {
    FormattedConfession {
        title: "Anonymous Confession".to_string(),
        body: body.to_string(),
        image_url: attachments.first().cloned(),
        footer: format!("#{} · anon {}", short_display_id, anon_tag),
    }
}

/// Delivers formatted messages to destination channels.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes one confession to a channel. Synchronous from the engine's
    /// point of view; completes or fails before the engine proceeds.
    async fn publish(
        &self,
        channel: &ChannelId,
        message: &FormattedConfession,
    ) -> Result<DeliveryHandle>;
}

//! Inbound event model and private-reply shape.
//!
//! These are the five inbound event kinds the gateway contract defines, plus
//! the private reply the dispatcher sends back to the originating identity.
//! Identities here are raw gateway user IDs; they are hashed the moment they
//! cross into the routing core and never logged.

/// One inbound gateway event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundEvent {
    /// Private text submission with no enclosing community context.
    DirectSubmission {
        /// Raw submitter identity.
        identity: String,
        /// Message text as received (prefix not yet stripped).
        body: String,
        /// Attachment URLs.
        attachments: Vec<String>,
    },
    /// Private free-text reply from an identity expected to hold a pending
    /// selection.
    NumericReply {
        /// Raw submitter identity.
        identity: String,
        /// Reply text, expected to be a 1-based position.
        body: String,
    },
    /// Direct-selection interaction carrying a candidate's stable token.
    SelectInteraction {
        /// Raw submitter identity.
        identity: String,
        /// The candidate's selection token.
        token: String,
    },
    /// Administrative command: route a destination to a channel.
    AdminSetChannel {
        /// Raw acting identity.
        identity: String,
        /// Destination the command is scoped to.
        destination_id: String,
        /// Channel to publish confessions to.
        channel_id: String,
        /// Whether the gateway reports the actor as an administrator.
        is_admin: bool,
    },
    /// Administrative command: turn routing off for a destination.
    AdminDisable {
        /// Raw acting identity.
        identity: String,
        /// Destination the command is scoped to.
        destination_id: String,
        /// Whether the gateway reports the actor as an administrator.
        is_admin: bool,
    },
}

/// Private reply to the originating identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    /// Reply text.
    pub text: String,
    /// Whether the reply is visible only to the recipient.
    pub ephemeral: bool,
}

impl Reply {
    /// A reply visible only to the recipient.
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ephemeral: true,
        }
    }
}

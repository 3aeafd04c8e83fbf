//! Event dispatcher: gateway events in, private replies out.
//!
//! One inbound event is handled at a time per identity; the routing engine
//! serializes further. The dispatcher owns all user-facing copy, maps the
//! engine's user errors to specific replies, and collapses infrastructure
//! failures to one generic message while logging the hashed identity.

use std::sync::Arc;

use whisperbox_core::{
    CandidateDestination, ChannelId, CoreError, DestinationId, IdentityHasher, RoutingEngine,
    Selection, SubmitOutcome,
};

use crate::events::{InboundEvent, Reply};

/// Prefix a private message must carry to count as a submission.
pub const SUBMISSION_PREFIX: &str = "confess:";

const REPLY_USAGE: &str = "Use the format: `confess: your message here`";
const REPLY_EMPTY: &str = "Confession cannot be empty.";
const REPLY_NO_DESTINATION: &str = "No destination has confessions enabled.";
const REPLY_POSTED: &str = "Your confession was posted anonymously.";
const REPLY_INVALID_SELECTION: &str = "Invalid selection.";
const REPLY_EXPIRED: &str = "That selection expired. Submit your confession again.";
const REPLY_ADMIN_REQUIRED: &str = "Admin permission required.";
const REPLY_GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Turns inbound gateway events into routing engine calls and private
/// replies.
pub struct Dispatcher {
    engine: Arc<RoutingEngine>,
}

impl Dispatcher {
    /// Creates a dispatcher over the given engine.
    pub fn new(engine: Arc<RoutingEngine>) -> Self {
        Self { engine }
    }

    /// Handles one inbound event and produces the private reply for it.
    pub async fn handle(&self, event: InboundEvent, now: u64) -> Reply {
        match event {
            InboundEvent::DirectSubmission {
                identity,
                body,
                attachments,
            } => self.on_submission(&identity, &body, attachments, now).await,
            InboundEvent::NumericReply { identity, body } => {
                self.on_selection(&identity, Selection::Numeric(body), now)
                    .await
            }
            InboundEvent::SelectInteraction { identity, token } => {
                self.on_selection(&identity, Selection::Token(token), now)
                    .await
            }
            InboundEvent::AdminSetChannel {
                identity,
                destination_id,
                channel_id,
                is_admin,
            } => {
                self.on_set_channel(&identity, &destination_id, &channel_id, is_admin, now)
                    .await
            }
            InboundEvent::AdminDisable {
                identity,
                destination_id,
                is_admin,
            } => {
                self.on_disable(&identity, &destination_id, is_admin, now)
                    .await
            }
        }
    }

    /// Classifies a raw private message the way the inbound contract
    /// expects: an identity with a live pending selection is replying to
    /// the disambiguation prompt, anyone else is submitting.
    pub async fn handle_private_message(
        &self,
        identity: &str,
        body: &str,
        attachments: Vec<String>,
        now: u64,
    ) -> Reply {
        let has_pending = match self.engine.has_pending(identity).await {
            Ok(has_pending) => has_pending,
            Err(e) => return self.infrastructure_reply(identity, &e),
        };
        let event = if has_pending {
            InboundEvent::NumericReply {
                identity: identity.to_string(),
                body: body.to_string(),
            }
        } else {
            InboundEvent::DirectSubmission {
                identity: identity.to_string(),
                body: body.to_string(),
                attachments,
            }
        };
        self.handle(event, now).await
    }

    async fn on_submission(
        &self,
        identity: &str,
        body: &str,
        attachments: Vec<String>,
        now: u64,
    ) -> Reply {
        // The submission prefix is gateway-surface syntax, not part of the
        // confession; the engine never sees it.
        let Some(confession) = strip_submission_prefix(body) else {
            return Reply::ephemeral(REPLY_USAGE);
        };

        match self.engine.submit(identity, confession, attachments, now).await {
            Ok(SubmitOutcome::Posted { .. }) => Reply::ephemeral(REPLY_POSTED),
            Ok(SubmitOutcome::SelectionPending { candidates }) => {
                Reply::ephemeral(selection_prompt(&candidates))
            }
            Err(e) => self.error_reply(identity, e),
        }
    }

    async fn on_selection(&self, identity: &str, selection: Selection, now: u64) -> Reply {
        match self.engine.resolve(identity, selection, now).await {
            Ok(SubmitOutcome::Posted { .. }) => Reply::ephemeral(REPLY_POSTED),
            // resolve never re-prompts
            Ok(SubmitOutcome::SelectionPending { candidates }) => {
                Reply::ephemeral(selection_prompt(&candidates))
            }
            Err(e) => self.error_reply(identity, e),
        }
    }

    async fn on_set_channel(
        &self,
        identity: &str,
        destination_id: &str,
        channel_id: &str,
        is_admin: bool,
        now: u64,
    ) -> Reply {
        if !is_admin {
            return Reply::ephemeral(REPLY_ADMIN_REQUIRED);
        }
        let destination = DestinationId::new(destination_id);
        let channel = ChannelId::new(channel_id);
        match self
            .engine
            .destinations()
            .set_destination(&destination, &channel, now)
            .await
        {
            Ok(()) => Reply::ephemeral(format!("Confession channel set to <#{}>.", channel)),
            Err(e) => self.infrastructure_reply(identity, &e),
        }
    }

    async fn on_disable(
        &self,
        identity: &str,
        destination_id: &str,
        is_admin: bool,
        now: u64,
    ) -> Reply {
        if !is_admin {
            return Reply::ephemeral(REPLY_ADMIN_REQUIRED);
        }
        let destination = DestinationId::new(destination_id);
        match self
            .engine
            .destinations()
            .disable_destination(&destination, now)
            .await
        {
            Ok(()) => Reply::ephemeral("Confessions disabled for this destination."),
            Err(e) => self.infrastructure_reply(identity, &e),
        }
    }

    fn error_reply(&self, identity: &str, error: CoreError) -> Reply {
        match error {
            CoreError::EmptyMessage => Reply::ephemeral(REPLY_EMPTY),
            CoreError::NoDestination => Reply::ephemeral(REPLY_NO_DESTINATION),
            CoreError::InvalidSelection { .. } => Reply::ephemeral(REPLY_INVALID_SELECTION),
            CoreError::SelectionExpired => Reply::ephemeral(REPLY_EXPIRED),
            other => self.infrastructure_reply(identity, &other),
        }
    }

    fn infrastructure_reply(&self, identity: &str, error: &CoreError) -> Reply {
        let token = IdentityHasher::token(identity);
        tracing::warn!("event handling failed for {}: {}", token, error);
        Reply::ephemeral(REPLY_GENERIC_FAILURE)
    }
}

/// Strips the case-insensitive submission prefix. None if the message does
/// not carry it.
fn strip_submission_prefix(body: &str) -> Option<&str> {
    let trimmed = body.trim_start();
    let prefix = trimmed.get(..SUBMISSION_PREFIX.len())?;
    if prefix.eq_ignore_ascii_case(SUBMISSION_PREFIX) {
        Some(&trimmed[SUBMISSION_PREFIX.len()..])
    } else {
        None
    }
}

/// The disambiguation prompt: candidates listed by 1-based position, in the
/// order established at submission.
fn selection_prompt(candidates: &[CandidateDestination]) -> String {
    let mut prompt = String::from("Which destination is this confession for?\n\n");
    for (i, candidate) in candidates.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, candidate.display_name));
    }
    prompt.push_str("\nReply with the number (expires in 5 minutes).");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use whisperbox_core::{
        now_unix, DeliveryHandle, Directory, FormattedConfession, Membership, MemoryKvStore,
        Publisher, Result as CoreResult,
    };

    struct FixedDirectory {
        rows: Vec<(String, Membership)>,
    }

    #[async_trait]
    impl Directory for FixedDirectory {
        async fn memberships(&self, raw_identity: &str) -> CoreResult<Vec<Membership>> {
            Ok(self
                .rows
                .iter()
                .filter(|(id, _)| id == raw_identity)
                .map(|(_, m)| m.clone())
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<(ChannelId, FormattedConfession)>>,
    }

    #[async_trait]
    impl Publisher for RecordingPublisher {
        async fn publish(
            &self,
            channel: &ChannelId,
            message: &FormattedConfession,
        ) -> CoreResult<DeliveryHandle> {
            let mut published = self.published.lock().unwrap();
            published.push((channel.clone(), message.clone()));
            Ok(DeliveryHandle(format!("msg-{}", published.len())))
        }
    }

    fn membership(dest: &str, name: &str) -> Membership {
        Membership {
            destination_id: DestinationId::new(dest),
            display_name: name.to_string(),
        }
    }

    async fn dispatcher(rows: Vec<(String, Membership)>, configured: &[(&str, &str)]) -> Dispatcher {
        let engine = Arc::new(RoutingEngine::new(
            Arc::new(MemoryKvStore::new()),
            Arc::new(RecordingPublisher::default()),
            Arc::new(FixedDirectory { rows }),
        ));
        for (dest, channel) in configured {
            engine
                .destinations()
                .set_destination(&DestinationId::new(dest), &ChannelId::new(channel), now_unix())
                .await
                .unwrap();
        }
        Dispatcher::new(engine)
    }

    #[test]
    fn test_prefix_stripping() {
        assert_eq!(strip_submission_prefix("confess: hi"), Some(" hi"));
        assert_eq!(strip_submission_prefix("CONFESS: hi"), Some(" hi"));
        assert_eq!(strip_submission_prefix("  Confess:hi"), Some("hi"));
        assert_eq!(strip_submission_prefix("hello"), None);
        assert_eq!(strip_submission_prefix(""), None);
    }

    #[test]
    fn test_selection_prompt_is_one_based() {
        let candidates = vec![
            CandidateDestination {
                id: DestinationId::new("d2"),
                display_name: "Gaming".to_string(),
            },
            CandidateDestination {
                id: DestinationId::new("d3"),
                display_name: "Music".to_string(),
            },
        ];
        let prompt = selection_prompt(&candidates);
        assert!(prompt.contains("1. Gaming"));
        assert!(prompt.contains("2. Music"));
        assert!(prompt.contains("expires in 5 minutes"));
    }

    #[tokio::test]
    async fn test_message_without_prefix_gets_usage_hint() {
        let d = dispatcher(vec![], &[]).await;
        let reply = d
            .handle_private_message("u1", "hello there", vec![], now_unix())
            .await;
        assert_eq!(reply.text, REPLY_USAGE);
        assert!(reply.ephemeral);
    }

    #[tokio::test]
    async fn test_submission_posts_to_single_destination() {
        let d = dispatcher(
            vec![("u1".to_string(), membership("d1", "One"))],
            &[("d1", "c1")],
        )
        .await;
        let reply = d
            .handle_private_message("u1", "confess: my secret", vec![], now_unix())
            .await;
        assert_eq!(reply.text, REPLY_POSTED);
    }

    #[tokio::test]
    async fn test_empty_confession_reply() {
        let d = dispatcher(
            vec![("u1".to_string(), membership("d1", "One"))],
            &[("d1", "c1")],
        )
        .await;
        let reply = d
            .handle_private_message("u1", "confess:    ", vec![], now_unix())
            .await;
        assert_eq!(reply.text, REPLY_EMPTY);
    }

    #[tokio::test]
    async fn test_no_destination_reply() {
        let d = dispatcher(vec![("u1".to_string(), membership("d1", "One"))], &[]).await;
        let reply = d
            .handle_private_message("u1", "confess: hi", vec![], now_unix())
            .await;
        assert_eq!(reply.text, REPLY_NO_DESTINATION);
    }

    #[tokio::test]
    async fn test_pending_then_numeric_reply_flow() {
        let d = dispatcher(
            vec![
                ("u2".to_string(), membership("d2", "Gaming")),
                ("u2".to_string(), membership("d3", "Music")),
            ],
            &[("d2", "c2"), ("d3", "c3")],
        )
        .await;
        let now = now_unix();

        let prompt = d
            .handle_private_message("u2", "confess: hi", vec![], now)
            .await;
        assert!(prompt.text.contains("1. Gaming"));

        // next private message from u2 is classified as a selection reply
        let bad = d.handle_private_message("u2", "7", vec![], now).await;
        assert_eq!(bad.text, REPLY_INVALID_SELECTION);

        let good = d.handle_private_message("u2", "2", vec![], now).await;
        assert_eq!(good.text, REPLY_POSTED);
    }

    #[tokio::test]
    async fn test_select_interaction_resolves_token() {
        let d = dispatcher(
            vec![
                ("u2".to_string(), membership("d2", "Gaming")),
                ("u2".to_string(), membership("d3", "Music")),
            ],
            &[("d2", "c2"), ("d3", "c3")],
        )
        .await;
        let now = now_unix();
        d.handle_private_message("u2", "confess: hi", vec![], now)
            .await;

        let reply = d
            .handle(
                InboundEvent::SelectInteraction {
                    identity: "u2".to_string(),
                    token: "d3".to_string(),
                },
                now,
            )
            .await;
        assert_eq!(reply.text, REPLY_POSTED);
    }

    #[tokio::test]
    async fn test_selection_without_pending_is_expired() {
        let d = dispatcher(vec![], &[]).await;
        let reply = d
            .handle(
                InboundEvent::NumericReply {
                    identity: "u9".to_string(),
                    body: "1".to_string(),
                },
                now_unix(),
            )
            .await;
        assert_eq!(reply.text, REPLY_EXPIRED);
    }

    #[tokio::test]
    async fn test_admin_commands_require_permission() {
        let d = dispatcher(vec![], &[]).await;
        let reply = d
            .handle(
                InboundEvent::AdminSetChannel {
                    identity: "u1".to_string(),
                    destination_id: "d1".to_string(),
                    channel_id: "c1".to_string(),
                    is_admin: false,
                },
                now_unix(),
            )
            .await;
        assert_eq!(reply.text, REPLY_ADMIN_REQUIRED);

        let reply = d
            .handle(
                InboundEvent::AdminDisable {
                    identity: "u1".to_string(),
                    destination_id: "d1".to_string(),
                    is_admin: false,
                },
                now_unix(),
            )
            .await;
        assert_eq!(reply.text, REPLY_ADMIN_REQUIRED);
    }

    #[tokio::test]
    async fn test_admin_set_channel_enables_routing() {
        let d = dispatcher(vec![("u1".to_string(), membership("d1", "One"))], &[]).await;
        let now = now_unix();

        let reply = d
            .handle(
                InboundEvent::AdminSetChannel {
                    identity: "admin".to_string(),
                    destination_id: "d1".to_string(),
                    channel_id: "c1".to_string(),
                    is_admin: true,
                },
                now,
            )
            .await;
        assert_eq!(reply.text, "Confession channel set to <#c1>.");

        let posted = d
            .handle_private_message("u1", "confess: hi", vec![], now)
            .await;
        assert_eq!(posted.text, REPLY_POSTED);
    }
}

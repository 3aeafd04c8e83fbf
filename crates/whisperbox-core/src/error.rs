//! Error types for the routing core.

/// Error types for confession routing operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The submitted message body was empty after trimming.
    #[error("confession body is empty")]
    EmptyMessage,

    /// A selection reply did not address any candidate.
    #[error("invalid selection '{given}' (expected 1..={max})")]
    InvalidSelection {
        /// The selection value as received.
        given: String,
        /// Number of candidates in the pending selection.
        max: usize,
    },

    /// No destination has routing enabled for the submitting identity.
    #[error("no destination available")]
    NoDestination,

    /// No pending selection exists for the identity: never created,
    /// expired, or already consumed.
    #[error("selection expired or not found")]
    SelectionExpired,

    /// The backing key-value store was unavailable.
    #[error("storage unavailable: {0}")]
    Storage(String),

    /// The messaging gateway rejected or failed the publish.
    #[error("publish failed: {0}")]
    Publish(String),

    /// The membership source could not be enumerated.
    #[error("membership lookup failed: {0}")]
    Membership(String),
}

impl CoreError {
    /// True for outcomes that are reported to the submitter as-is
    /// (validation and not-found), false for infrastructure failures
    /// that collapse to a generic user-facing message.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CoreError::EmptyMessage
                | CoreError::InvalidSelection { .. }
                | CoreError::NoDestination
                | CoreError::SelectionExpired
        )
    }
}

/// Result alias for routing core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

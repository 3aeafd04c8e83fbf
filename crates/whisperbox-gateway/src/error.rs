//! Error types for the gateway surface.

use whisperbox_core::CoreError;

/// Error types for gateway configuration and event handling.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A required environment variable was not set.
    #[error("missing environment variable: {0}")]
    MissingEnv(String),

    /// The acting identity lacks administrator permission.
    #[error("admin permission required")]
    PermissionDenied,

    /// A routing core operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

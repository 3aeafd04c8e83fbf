#![warn(missing_docs)]

//! Whisperbox gateway surface: event model, dispatcher, admin commands,
//! environment configuration.

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;

pub use commands::{command_manifest, registration_payload, CommandSpec};
pub use config::GatewayConfig;
pub use dispatch::{Dispatcher, SUBMISSION_PREFIX};
pub use error::{GatewayError, Result};
pub use events::{InboundEvent, Reply};

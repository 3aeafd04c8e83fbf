//! Slash-command registration manifest.
//!
//! The gateway requires commands to be registered ahead of time through its
//! REST surface; this module describes ours and builds the registration
//! body. Admin-only commands carry the administrator default-permission
//! flag so the gateway hides them from regular members.

use serde_json::{json, Value};

/// Gateway permission flag for administrator-only commands.
const PERMISSION_ADMINISTRATOR: u64 = 1 << 3;

/// One registrable slash command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    /// Command name as typed by the user.
    pub name: &'static str,
    /// Short description shown in the command picker.
    pub description: &'static str,
    /// Whether only administrators may invoke it.
    pub admin_only: bool,
}

/// The commands this service registers.
pub fn command_manifest() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "setconfession",
            description: "Set the confession channel for this destination",
            admin_only: true,
        },
        CommandSpec {
            name: "disableconfession",
            description: "Turn confessions off for this destination",
            admin_only: true,
        },
    ]
}

/// Serializes the manifest into the gateway's command-registration body.
pub fn registration_payload() -> Value {
    let commands: Vec<Value> = command_manifest()
        .into_iter()
        .map(|spec| {
            let mut command = json!({
                "name": spec.name,
                "description": spec.description,
            });
            if spec.admin_only {
                command["default_member_permissions"] =
                    Value::String(PERMISSION_ADMINISTRATOR.to_string());
            }
            command
        })
        .collect();
    Value::Array(commands)
}

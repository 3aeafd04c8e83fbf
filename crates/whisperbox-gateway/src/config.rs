//! Environment-driven gateway configuration.
//!
//! Every required variable missing at startup is a hard error naming the
//! variable, so a misconfigured deployment fails before it connects.

use crate::error::{GatewayError, Result};

/// Environment variable holding the gateway bot token.
pub const ENV_GATEWAY_TOKEN: &str = "WBX_GATEWAY_TOKEN";
/// Environment variable holding the key-value table name.
pub const ENV_TABLE: &str = "WBX_TABLE";
/// Environment variable holding the key-value service region.
pub const ENV_REGION: &str = "WBX_REGION";

const DEFAULT_REGION: &str = "us-east-1";

/// Process configuration for the gateway binary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Authentication token for the chat gateway connection.
    pub gateway_token: String,
    /// Table holding destinations, pending selections and records.
    pub table_name: String,
    /// Region of the managed key-value service.
    pub region: String,
}

impl GatewayConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| GatewayError::MissingEnv(name.to_string()))
        };
        Ok(Self {
            gateway_token: require(ENV_GATEWAY_TOKEN)?,
            table_name: require(ENV_TABLE)?,
            region: lookup(ENV_REGION)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        })
    }
}

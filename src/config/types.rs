//! Configuration type definitions.

use serde::Deserialize;

use crate::routing::classifier::{GOODBYE_CANDIDATES, QUESTIONS_CHANNEL, WELCOME_CANDIDATES};

/// Placeholder token shipped in the example configuration.
pub const TOKEN_PLACEHOLDER: &str = "YOUR_DISCORD_TOKEN_HERE";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub token: String,
    /// Prefix for bot commands.
    pub command_prefix: String,
    /// Number of messages kept per channel in the gateway cache.
    pub message_cache_size: usize,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            command_prefix: "!".to_string(),
            message_cache_size: 10_000,
        }
    }
}

/// Channel names used for routing decisions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Posts in this channel are moved into threads.
    pub questions_channel: String,
    /// Welcome channel candidates, in order of preference.
    pub welcome_channels: Vec<String>,
    /// Goodbye channel candidates, in order of preference.
    pub goodbye_channels: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            questions_channel: QUESTIONS_CHANNEL.to_string(),
            welcome_channels: WELCOME_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            goodbye_channels: GOODBYE_CANDIDATES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

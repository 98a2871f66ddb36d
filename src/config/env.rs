//! Environment variable overrides for configuration.
//!
//! Supported variables:
//! - `DOORMAN_DISCORD_TOKEN` - Discord bot token (`DISCORD_TOKEN` is also accepted)
//! - `DOORMAN_COMMAND_PREFIX` - Command prefix
//! - `DOORMAN_QUESTIONS_CHANNEL` - Name of the questions channel
//! - `DOORMAN_CONFIG` - Path of the config file

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "DOORMAN";

/// Unprefixed token variable used by most Discord bot deployments.
const FALLBACK_TOKEN_VAR: &str = "DISCORD_TOKEN";

/// Apply environment variable overrides to a config.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |key| env::var(key).ok())
}

/// Apply overrides read through `lookup`.
///
/// Empty values are ignored so a blank variable never wipes a configured value.
pub fn apply_overrides_from<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

    if let Some(token) = get(&format!("{}_DISCORD_TOKEN", ENV_PREFIX)).or_else(|| get(FALLBACK_TOKEN_VAR)) {
        config.discord.token = token;
    }
    if let Some(prefix) = get(&format!("{}_COMMAND_PREFIX", ENV_PREFIX)) {
        config.discord.command_prefix = prefix;
    }
    if let Some(channel) = get(&format!("{}_QUESTIONS_CHANNEL", ENV_PREFIX)) {
        config.routing.questions_channel = channel;
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `DOORMAN_CONFIG`, otherwise returns "doorman.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "doorman.conf".to_string())
}

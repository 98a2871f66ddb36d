//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::{Config, TOKEN_PLACEHOLDER};

/// Longest accepted command prefix.
const MAX_PREFIX_LEN: usize = 10;

/// Validate a configuration and return detailed errors.
///
/// Every problem is reported at once, one per line.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Discord
    if config.discord.token.is_empty() {
        errors.push(
            "discord.token is required (set DOORMAN_DISCORD_TOKEN or DISCORD_TOKEN)".to_string(),
        );
    }
    if config.discord.token == TOKEN_PLACEHOLDER {
        errors.push("discord.token has not been configured (still using placeholder)".to_string());
    }
    if config.discord.command_prefix.trim().is_empty() {
        errors.push("discord.command_prefix must not be empty".to_string());
    }
    if config.discord.command_prefix.chars().count() > MAX_PREFIX_LEN {
        errors.push(format!(
            "discord.command_prefix must be at most {} characters (got {})",
            MAX_PREFIX_LEN,
            config.discord.command_prefix.chars().count()
        ));
    }
    if config.discord.message_cache_size == 0 {
        errors.push("discord.message_cache_size must be non-zero".to_string());
    }

    // Routing
    if config.routing.questions_channel.trim().is_empty() {
        errors.push("routing.questions_channel must not be empty".to_string());
    }
    check_candidates("routing.welcome_channels", &config.routing.welcome_channels, &mut errors);
    check_candidates("routing.goodbye_channels", &config.routing.goodbye_channels, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

fn check_candidates(field: &str, names: &[String], errors: &mut Vec<String>) {
    if names.is_empty() {
        errors.push(format!("{} is empty - no channel can be selected", field));
    }
    for (i, name) in names.iter().enumerate() {
        if name.trim().is_empty() {
            errors.push(format!("{}[{}] must not be empty", field, i));
        }
    }
}

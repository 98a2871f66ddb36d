//! Configuration file parsing (HOCON format).

use std::path::Path;

use hocon::HoconLoader;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    HoconLoader::new()
        .strict()
        .load_file(path)
        .map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

/// Load configuration from a file, or use defaults when the file is absent.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

/// Load configuration from a HOCON string.
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    HoconLoader::new()
        .strict()
        .load_str(content)
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    #[test]
    fn test_full_config() {
        let config = load_config_str(
            r#"
            discord {
              token = "abc"
              command_prefix = "?"
              message_cache_size = 500
            }
            routing {
              questions_channel = "help"
              welcome_channels = ["arrivals", "general"]
              goodbye_channels = ["departures"]
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.discord.token, "abc");
        assert_eq!(config.discord.command_prefix, "?");
        assert_eq!(config.discord.message_cache_size, 500);
        assert_eq!(config.routing.questions_channel, "help");
        assert_eq!(config.routing.welcome_channels, vec!["arrivals", "general"]);
        assert_eq!(config.routing.goodbye_channels, vec!["departures"]);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = load_config_str(r#"discord { token = "abc" }"#).unwrap();
        assert_eq!(config.discord.command_prefix, "!");
        assert_eq!(config.discord.message_cache_size, 10_000);
        assert_eq!(config.routing.questions_channel, "questions");
        assert_eq!(config.routing.welcome_channels[0], "welcome");
        assert_eq!(config.routing.goodbye_channels[0], "goodbye");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config_or_default("/nonexistent/doorman.conf").unwrap();
        assert!(config.discord.token.is_empty());
        assert_eq!(config.routing.questions_channel, "questions");
    }

    #[test]
    fn test_malformed_config_fails() {
        assert_err!(load_config_str("discord { token = "));
    }

    #[test]
    fn test_unclosed_section_is_rejected() {
        assert_err!(load_config_str(r#"routing { questions_channel = "help""#));
    }

    #[test]
    fn test_unclosed_list_is_rejected() {
        assert_err!(load_config_str(
            r#"discord { token = "abc" } routing { welcome_channels = ["a", }"#
        ));
    }
}

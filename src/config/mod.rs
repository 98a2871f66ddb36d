//! Configuration loading, overrides and validation.

pub mod env;
pub mod parser;
pub mod types;
pub mod validate;

use tracing::info;

use crate::common::error::Result;

pub use parser::load_config_or_default;
pub use types::*;
pub use validate::validate_config;

/// Load the config file, apply environment overrides, then validate.
///
/// A missing file is not an error: defaults plus environment variables can
/// be enough to run.
pub fn load_and_validate(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        info!("Loading configuration from {}", path);
    } else {
        info!("No config file at {}, using defaults and environment", path);
    }

    let config = env::apply_env_overrides(load_config_or_default(path)?);
    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::{AppError, ConfigError};

    #[test]
    fn test_malformed_file_is_a_config_error() {
        let path = std::env::temp_dir().join(format!("doorman-malformed-{}.conf", std::process::id()));
        std::fs::write(&path, r#"routing { questions_channel = "help""#).unwrap();

        let result = load_and_validate(path.to_str().unwrap());
        std::fs::remove_file(&path).unwrap();

        let error = result.unwrap_err();
        assert!(matches!(error, AppError::Config(ConfigError::ParseError { .. })));
        assert!(error.to_string().starts_with("Configuration error:"));
    }
}

//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::BridgeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable consulted when the config file carries no token.
pub const TOKEN_ENV: &str = "GITLAB_TOKEN";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content, std::env::var(TOKEN_ENV).ok())
}

/// Parse TOML, fill the token from `env_token` when the file has none, then validate.
pub fn parse_config(content: &str, env_token: Option<String>) -> Result<BridgeConfig, ConfigError> {
    let mut config: BridgeConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    apply_env_token(&mut config, env_token);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Use `env_token` when the configured token is blank.
pub fn apply_env_token(config: &mut BridgeConfig, env_token: Option<String>) {
    if config.gitlab.token.trim().is_empty() {
        if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
            config.gitlab.token = token;
        }
    }
}

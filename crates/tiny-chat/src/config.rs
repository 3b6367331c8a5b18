use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::fs;
use std::path::Path;

use serde::Deserialize;

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Error loading the configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not valid YAML or misses required keys.
    Parse(serde_yaml::Error),
    /// The file parsed but carries unusable values.
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "cannot read config: {err}"),
            ConfigError::Parse(err) => write!(f, "cannot parse config: {err}"),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

impl StdError for ConfigError {}

/// Process-wide configuration, loaded once at startup.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatConfig {
    /// Selectable model identifiers, in display order. The first one
    /// is the default.
    pub models: Vec<String>,
    /// Bearer token for the completion endpoint.
    pub api_key: String,
    /// The completion endpoint URL.
    pub api_url: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Overrides the built-in system prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl ChatConfig {
    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_yaml(&raw)
    }

    fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let config: ChatConfig =
            serde_yaml::from_str(raw).map_err(ConfigError::Parse)?;
        if config.models.is_empty() {
            return Err(ConfigError::Invalid("config lists no models"));
        }
        Ok(config)
    }
}

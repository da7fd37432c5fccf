//! CLI configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/meetupinator/config.toml` by default. Every key is optional.
//!
//! ```toml
//! api_key = "..."
//! base_url = "https://api.meetup.com"
//! timeout_secs = 30
//! max_retries = 3
//! weeks = 4
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use meetupinator_api::{ClientConfig, Credential};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Configuration for the meetupinator CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// meetup.com API key. `MEETUP_API_KEY` is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override for the API location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Retries after a failed request.
    pub max_retries: u32,

    /// Default week window for `events` when `--weeks` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weeks: Option<u32>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout_secs: ClientConfig::DEFAULT_TIMEOUT_SECS,
            max_retries: ClientConfig::DEFAULT_MAX_RETRIES,
            weeks: None,
        }
    }
}

impl CliConfig {
    /// Loads configuration from the default path, or defaults if it does not exist.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meetupinator")
            .join("config.toml")
    }

    /// Builds the API client configuration.
    ///
    /// The key comes from `cli_key`, then `api_key` in this file, then the
    /// `MEETUP_API_KEY` environment variable.
    pub fn client_config(&self, cli_key: Option<&str>) -> CliResult<ClientConfig> {
        let explicit = cli_key
            .filter(|key| !key.is_empty())
            .or(self.api_key.as_deref());
        let credential = Credential::from_env(explicit)?;

        let mut config = ClientConfig::new(credential)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_retries(self.max_retries);
        if let Some(ref base_url) = self.base_url {
            config = config.with_base_url(base_url)?;
        }
        Ok(config)
    }

    /// Returns a copy safe to print.
    pub fn redacted(&self) -> Self {
        Self {
            api_key: self.api_key.as_ref().map(|_| "[REDACTED]".to_string()),
            ..self.clone()
        }
    }
}

//! Configuration commands.

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Dump the current configuration to stdout, API key redacted.
pub fn dump(config: &CliConfig) -> CliResult<()> {
    let toml_str = toml::to_string_pretty(&config.redacted())
        .map_err(|e| CliError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", CliConfig::default_path().display());
    println!("{}", toml_str);
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> CliResult<()> {
    println!("config: {}", CliConfig::default_path().display());
    Ok(())
}

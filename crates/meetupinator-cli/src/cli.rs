//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// meetupinator - Upcoming meetup events for your groups, as CSV
#[derive(Debug, Parser)]
#[command(name = "meetupinator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "MEETUPINATOR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// meetup.com API key (falls back to the config file, then MEETUP_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch upcoming events for the groups listed in a file and write them as CSV
    Events {
        /// File with one group URL name per line
        #[arg(long, short)]
        input: PathBuf,

        /// CSV file to write
        #[arg(long, short)]
        output: PathBuf,

        /// Only include events in the next N weeks
        #[arg(long, short, value_parser = clap::value_parser!(u32).range(1..))]
        weeks: Option<u32>,
    },

    /// Print the id of a group
    GroupId {
        /// Group URL name, e.g. "rust-nyc"
        name: String,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Show configuration file path
    Path,
}

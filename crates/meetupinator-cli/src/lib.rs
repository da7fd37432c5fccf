//! Command-line front end for the meetup API client.
//!
//! Reads a list of group names, asks [`meetupinator_api::MeetupClient`] for
//! their upcoming events, and writes the result as CSV.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod finder;
pub mod input;
pub mod writer;

pub use cli::Cli;
pub use error::{CliError, CliResult};

//! Subcommand implementations.

pub mod config;
pub mod events;
pub mod group_id;

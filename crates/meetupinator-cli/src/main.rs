//! meetupinator CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use meetupinator_api::MeetupClient;
use meetupinator_cli::cli::{Cli, Command, ConfigAction};
use meetupinator_cli::commands;
use meetupinator_cli::config::CliConfig;
use meetupinator_cli::error::CliResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = match cli.config {
        Some(ref path) => CliConfig::load_from(path)?,
        None => CliConfig::load()?,
    };

    match cli.command {
        Command::Events {
            ref input,
            ref output,
            weeks,
        } => {
            let client = MeetupClient::new(config.client_config(cli.api_key.as_deref())?)?;
            commands::events::run(&client, input, output, weeks.or(config.weeks)).await
        }
        Command::GroupId { ref name } => {
            let client = MeetupClient::new(config.client_config(cli.api_key.as_deref())?)?;
            commands::group_id::run(&client, name).await
        }
        Command::Config { ref action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}

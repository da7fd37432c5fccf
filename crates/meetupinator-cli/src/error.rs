//! CLI error types.

use std::fmt;

use meetupinator_api::ApiError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Configuration error.
    Config(String),
    /// meetup API error.
    Api(ApiError),
    /// IO error.
    Io(std::io::Error),
    /// Unusable input file.
    Input(String),
    /// CSV output error.
    Csv(csv::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Api(err) => write!(f, "API error: {}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Input(msg) => write!(f, "invalid input: {}", msg),
            Self::Csv(err) => write!(f, "CSV error: {}", err),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

impl From<csv::Error> for CliError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

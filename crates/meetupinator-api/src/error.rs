//! Error types for meetup API operations.
//!
//! Every failure surfaced by [`MeetupClient`](crate::MeetupClient) is an
//! [`ApiError`] tagged with an [`ApiErrorCode`]. The code decides whether the
//! request pipeline spends a retry on it.

use std::fmt;
use thiserror::Error;

/// The category of an API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorCode {
    /// No usable credential, invalid base URL, or the HTTP client could not be built.
    Configuration,
    /// Caller supplied an argument the upstream would never accept.
    InvalidInput,
    /// Network error - connection refused, timeout, body read failure.
    Transport,
    /// The upstream answered with a non-2xx status.
    UpstreamStatus,
    /// The body was not valid JSON or not a results envelope.
    ResponseParse,
    /// Group resolution matched nothing.
    Lookup,
}

impl ApiErrorCode {
    /// Returns true if the request pipeline retries this error.
    ///
    /// Status, transport and parse failures share one budget and are treated
    /// alike.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport | Self::UpstreamStatus | Self::ResponseParse
        )
    }

    /// Returns a machine-friendly name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration_error",
            Self::InvalidInput => "invalid_input",
            Self::Transport => "transport_failure",
            Self::UpstreamStatus => "upstream_status",
            Self::ResponseParse => "response_parse",
            Self::Lookup => "lookup_failure",
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to the meetup API.
#[derive(Debug, Error)]
pub struct ApiError {
    code: ApiErrorCode,
    message: String,
    /// HTTP status, for [`ApiErrorCode::UpstreamStatus`] only.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ApiError {
    /// Creates a new error with the given code and message.
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Configuration, message)
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::InvalidInput, message)
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Transport, message)
    }

    /// Creates an upstream status error for the given HTTP status code.
    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        let mut err = Self::new(ApiErrorCode::UpstreamStatus, message);
        err.status = Some(status);
        err
    }

    /// Creates a response parse error.
    pub fn response_parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::ResponseParse, message)
    }

    /// Creates a lookup error.
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Lookup, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ApiErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status of an upstream status error.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns true if the request pipeline retries this error.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for meetup API operations.
pub type ApiResult<T> = Result<T, ApiError>;

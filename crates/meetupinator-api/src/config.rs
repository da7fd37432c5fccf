//! Client configuration and credential resolution.
//!
//! The client never reads the environment itself. Bootstrap code calls
//! [`Credential::from_env`] once and hands the result to [`ClientConfig`].

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{ApiError, ApiResult};

/// Environment variable holding the meetup API key.
pub const API_KEY_ENV: &str = "MEETUP_API_KEY";

/// A non-empty meetup API key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Picks the active credential.
    ///
    /// A non-empty `explicit` value wins; otherwise a non-empty `env` value
    /// is used. With neither, resolution fails with a configuration error.
    pub fn resolve(explicit: Option<&str>, env: Option<&str>) -> ApiResult<Self> {
        explicit
            .filter(|key| !key.is_empty())
            .or_else(|| env.filter(|key| !key.is_empty()))
            .map(|key| Self(key.to_string()))
            .ok_or_else(|| ApiError::configuration(format!("no {} provided", API_KEY_ENV)))
    }

    /// Resolves against `explicit` and the `MEETUP_API_KEY` environment variable.
    pub fn from_env(explicit: Option<&str>) -> ApiResult<Self> {
        Self::from_env_var(explicit, API_KEY_ENV)
    }

    fn from_env_var(explicit: Option<&str>, var: &str) -> ApiResult<Self> {
        let env = std::env::var(var).ok();
        Self::resolve(explicit, env.as_deref())
    }

    /// Returns the raw key.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// Configuration for [`MeetupClient`](crate::MeetupClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The API key sent with every request.
    pub credential: Credential,

    /// Scheme and host of the API, e.g. `https://api.meetup.com`.
    pub base_url: Url,

    /// Transport-level timeout for a single attempt.
    pub timeout: Duration,

    /// Additional attempts after the first one fails.
    pub max_retries: u32,

    /// User agent string.
    pub user_agent: String,
}

impl ClientConfig {
    /// Default API location.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.meetup.com";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default retry budget.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Creates a configuration with defaults around the given credential.
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            base_url: Url::parse(Self::DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            max_retries: Self::DEFAULT_MAX_RETRIES,
            user_agent: format!("meetupinator/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the API base URL.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL does not parse or cannot
    /// carry a path.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> ApiResult<Self> {
        let parsed = Url::parse(base_url.as_ref()).map_err(|e| {
            ApiError::configuration(format!("invalid base URL '{}': {}", base_url.as_ref(), e))
                .with_source(e)
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::configuration(format!(
                "base URL '{}' cannot carry a path",
                base_url.as_ref()
            )));
        }
        self.base_url = parsed;
        Ok(self)
    }

    /// Sets the transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

//! meetup.com API client.
//!
//! [`MeetupClient`] exposes group resolution and upcoming-event listing on top
//! of a single GET pipeline that classifies the response, parses the JSON
//! envelope, and retries failed attempts against a fixed budget.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::types::{EventRecord, GroupId, GroupSummary, ResultsEnvelope};

const GROUPS_ENDPOINT: &str = "/2/groups";
const EVENTS_ENDPOINT: &str = "/2/events";

/// Replacement for the API key in request targets that end up in errors and logs.
///
/// No brackets: they would be percent-encoded in the query string.
const REDACTED: &str = "REDACTED";

/// Client for the meetup.com v2 API.
#[derive(Debug)]
pub struct MeetupClient {
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl MeetupClient {
    /// Creates a new client from the given configuration.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ApiError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Looks up the identifier of the group with the given URL name.
    ///
    /// Only the first match is used. No match at all is a
    /// [`Lookup`](crate::ApiErrorCode::Lookup) error.
    pub async fn resolve_group_id(&self, group_name: &str) -> ApiResult<GroupId> {
        if group_name.trim().is_empty() {
            return Err(ApiError::invalid_input("group name must not be empty"));
        }

        let url = self.groups_url(group_name);
        let envelope: ResultsEnvelope<GroupSummary> = self.get_results(&url).await?;

        let group = envelope.results.into_iter().next().ok_or_else(|| {
            ApiError::lookup(format!("no group found with URL name '{}'", group_name))
        })?;

        debug!("resolved group {} to id {}", group_name, group.id);
        Ok(group.id)
    }

    /// Fetches upcoming events for all `group_ids` in one request.
    ///
    /// With `weeks`, only events starting within that many weeks from now are
    /// returned. An empty result is not an error.
    pub async fn fetch_upcoming_events(
        &self,
        group_ids: &[GroupId],
        weeks: Option<u32>,
    ) -> ApiResult<Vec<EventRecord>> {
        if group_ids.is_empty() {
            return Err(ApiError::invalid_input("at least one group id is required"));
        }
        if weeks == Some(0) {
            return Err(ApiError::invalid_input("week count must be positive"));
        }

        let url = self.events_url(group_ids, weeks);
        let envelope: ResultsEnvelope<EventRecord> = self.get_results(&url).await?;

        debug!(
            "fetched {} upcoming events for {} groups",
            envelope.results.len(),
            group_ids.len()
        );
        Ok(envelope.results)
    }

    /// Appends `path` to whatever path the base URL already has.
    fn endpoint_url(&self, path: &str) -> Url {
        let mut url = self.config.base_url.clone();
        let joined = format!("{}{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url
    }

    fn groups_url(&self, group_name: &str) -> Url {
        let mut url = self.endpoint_url(GROUPS_ENDPOINT);
        url.query_pairs_mut()
            .append_pair("key", self.config.credential.expose())
            .append_pair("group_urlname", group_name);
        url
    }

    fn events_url(&self, group_ids: &[GroupId], weeks: Option<u32>) -> Url {
        let joined = group_ids
            .iter()
            .map(GroupId::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let mut url = self.endpoint_url(EVENTS_ENDPOINT);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("sign", "true")
                .append_pair("photo-host", "public")
                .append_pair("status", "upcoming")
                .append_pair("key", self.config.credential.expose())
                .append_pair("group_id", &joined);
            if let Some(weeks) = weeks {
                // Open lower bound means "from now".
                query.append_pair("time", &format!(",{}w", weeks));
            }
        }
        url
    }

    /// Runs the GET pipeline for `url`, retrying failed attempts.
    ///
    /// The error of the final attempt is returned once the budget is spent.
    async fn get_results<T: DeserializeOwned>(&self, url: &Url) -> ApiResult<ResultsEnvelope<T>> {
        let target = redacted_target(url);
        let max_attempts = self.config.max_retries.saturating_add(1);
        let mut last_error: Option<ApiError> = None;

        for attempt in 1..=max_attempts {
            debug!("GET {} (attempt {}/{})", target, attempt, max_attempts);

            match self.attempt(url, &target).await {
                Ok(envelope) => return Ok(envelope),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if attempt < max_attempts {
                        warn!(
                            "attempt {}/{} for {} failed, retrying: {}",
                            attempt, max_attempts, target, e
                        );
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ApiError::transport(format!("no attempt was made for {}", target))))
    }

    /// One GET, classified into success, status failure, or parse failure.
    async fn attempt<T: DeserializeOwned>(&self, url: &Url, target: &str) -> ApiResult<T> {
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(target, e))?;

        let status = response.status();

        if !status.is_success() {
            let body = if body_permitted(status) {
                Some(match response.text().await {
                    Ok(body) => body,
                    Err(e) => format!("<body unavailable: {}>", e.without_url()),
                })
            } else {
                None
            };
            let message = format!(
                "call to {} failed: {} - {}.{}",
                target,
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                body_section(body.as_deref())
            );
            return Err(ApiError::upstream_status(status.as_u16(), message));
        }

        let body = response.text().await.map_err(|e| {
            let e = e.without_url();
            ApiError::transport(format!("failed to read response for call to {}: {}", target, e))
                .with_source(e)
        })?;

        serde_json::from_str(&body).map_err(|e| {
            let shown = body_permitted(status).then_some(body.as_str());
            ApiError::response_parse(format!(
                "unable to parse the response for call to {}.{}",
                target,
                body_section(shown)
            ))
            .with_source(e)
        })
    }
}

fn transport_error(target: &str, e: reqwest::Error) -> ApiError {
    // reqwest embeds the full URL, API key included.
    let e = e.without_url();
    let message = if e.is_timeout() {
        format!("call to {} timed out", target)
    } else if e.is_connect() {
        format!("connection failed for call to {}: {}", target, e)
    } else {
        format!("call to {} failed: {}", target, e)
    };
    ApiError::transport(message).with_source(e)
}

/// Informational, 204 and 304 responses carry no body.
fn body_permitted(status: reqwest::StatusCode) -> bool {
    !(status.is_informational()
        || status == reqwest::StatusCode::NO_CONTENT
        || status == reqwest::StatusCode::NOT_MODIFIED)
}

fn body_section(body: Option<&str>) -> String {
    match body {
        Some(body) => format!("\nResponse Body:\n{}", body),
        None => String::new(),
    }
}

fn redacted_target(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            let value = if name == "key" {
                REDACTED.to_string()
            } else {
                value.into_owned()
            };
            (name.into_owned(), value)
        })
        .collect();

    let mut redacted = url.clone();
    if !pairs.is_empty() {
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
    }
    redacted.to_string()
}

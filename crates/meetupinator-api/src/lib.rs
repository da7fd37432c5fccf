//! meetup.com API client.
//!
//! This crate talks to the two read-only meetup endpoints the tool needs:
//!
//! - [`MeetupClient::resolve_group_id`] - group URL name to group id
//! - [`MeetupClient::fetch_upcoming_events`] - upcoming events for a set of groups
//!
//! Both share one GET pipeline with a fixed retry budget, see [`ClientConfig`].
//!
//! # Example
//!
//! ```ignore
//! use meetupinator_api::{ClientConfig, Credential, MeetupClient};
//!
//! let credential = Credential::from_env(None)?;
//! let client = MeetupClient::new(ClientConfig::new(credential))?;
//! let id = client.resolve_group_id("rust-nyc").await?;
//! let events = client.fetch_upcoming_events(&[id], Some(2)).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::MeetupClient;
pub use config::{API_KEY_ENV, ClientConfig, Credential};
pub use error::{ApiError, ApiErrorCode, ApiResult};
pub use types::{EventRecord, GroupId};

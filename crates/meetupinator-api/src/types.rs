//! Wire types shared by the groups and events endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An event as returned by the upstream, left uninterpreted.
pub type EventRecord = serde_json::Map<String, serde_json::Value>;

/// Identifier of a group on the upstream service.
///
/// The API sends ids as JSON numbers, but strings are accepted too; either
/// way the textual form is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawGroupId")]
pub struct GroupId(String);

impl GroupId {
    /// Wraps an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGroupId {
    Number(serde_json::Number),
    Text(String),
}

impl From<RawGroupId> for GroupId {
    fn from(raw: RawGroupId) -> Self {
        match raw {
            RawGroupId::Number(n) => Self(n.to_string()),
            RawGroupId::Text(s) => Self(s),
        }
    }
}

/// The `{ "results": [...] }` body both endpoints answer with.
#[derive(Debug, Deserialize)]
pub(crate) struct ResultsEnvelope<T> {
    pub(crate) results: Vec<T>,
}

/// The part of a group record this client reads.
#[derive(Debug, Deserialize)]
pub(crate) struct GroupSummary {
    pub(crate) id: GroupId,
}

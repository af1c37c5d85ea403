// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types produced by a Gerrit source's `stream-events` output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `change` sub-record present on change-related events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeInfo {
    pub project: String,
    pub branch: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `refUpdate` sub-record present on ref-updated events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefUpdateInfo {
    pub project: String,
    #[serde(rename = "refName")]
    pub ref_name: String,
    #[serde(default, rename = "oldRev")]
    pub old_rev: Option<String>,
    #[serde(default, rename = "newRev")]
    pub new_rev: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `patchSet` sub-record present on patch-set events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchSetInfo {
    pub revision: String,
    #[serde(default, rename = "ref")]
    pub ref_: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `author` sub-record present on comment/review events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single parsed line of `gerrit stream-events` output.
///
/// Every top-level JSON field is either a typed field below or preserved
/// verbatim in `extra`, so a plugin author can reach fields this crate
/// doesn't know about by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub change: Option<ChangeInfo>,
    #[serde(default, rename = "refUpdate")]
    pub ref_update: Option<RefUpdateInfo>,
    #[serde(default, rename = "patchSet")]
    pub patch_set: Option<PatchSetInfo>,
    #[serde(default)]
    pub author: Option<AuthorInfo>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// The project this event concerns, falling back from `change` to
    /// `refUpdate`. `None` if neither sub-record is present.
    pub fn project(&self) -> Option<&str> {
        self.change
            .as_ref()
            .map(|c| c.project.as_str())
            .or_else(|| self.ref_update.as_ref().map(|r| r.project.as_str()))
    }

    /// The branch/ref this event concerns, falling back from `change.branch`
    /// to `refUpdate.refName`.
    pub fn branch(&self) -> Option<&str> {
        self.change
            .as_ref()
            .map(|c| c.branch.as_str())
            .or_else(|| self.ref_update.as_ref().map(|r| r.ref_name.as_str()))
    }
}

/// Parse one complete line of JSON into an [`Event`].
///
/// Unknown event kinds never fail to parse — their fields simply end up in
/// `extra` with no typed sub-records populated.
pub fn parse(line: &str) -> Result<Event, ParseError> {
    serde_json::from_str(line).map_err(|e| ParseError(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
#[error("malformed event JSON: {0}")]
pub struct ParseError(pub String);

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

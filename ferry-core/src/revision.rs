//! Revisions: identifiers for one point in an origin's history.
//!
//! Every origin produces values implementing [`Revision`]. Only
//! [`Revision::as_string`] and [`Revision::label_name`] are required; the
//! optional provenance accessors default to "absent" so backends override
//! only what they can actually supply.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::error::Result;

/// A point in the history of an origin. For git, a commit SHA-1.
pub trait Revision: fmt::Debug {
    /// Stable string form of this revision, accepted back by the origin that produced it.
    ///
    /// Unlike the `Debug` output this never changes between calls or runs.
    fn as_string(&self) -> &str;

    /// Label used in destination commit messages to cite this revision, e.g. `GitOrigin-RevId`.
    fn label_name(&self) -> &str;

    /// Submission time of this revision.
    ///
    /// `Ok(None)` means the backend does not track timestamps at all. An `Err`
    /// means it does, but this revision's metadata could not be read.
    fn read_timestamp(&self) -> Result<Option<DateTime<FixedOffset>>> {
        Ok(None)
    }

    /// The human-facing reference this revision was resolved from (e.g. `main`), if any.
    fn context_reference(&self) -> Option<&str> {
        None
    }

    /// Labels known to apply to exactly this revision, such as a review URL.
    ///
    /// Never populate this from a broader context like "head of a branch":
    /// a workflow may migrate only part of that history, and the labels would
    /// then be attributed to unrelated changes.
    fn associated_labels(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

impl PartialEq for dyn Revision + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.as_string() == other.as_string()
    }
}

impl Eq for dyn Revision + '_ {}

/// Render the commit-message line citing a revision: `<label>: <revision>`.
pub fn format_label(revision: &dyn Revision) -> String {
    format!("{}: {}", revision.label_name(), revision.as_string())
}

/// An immutable revision whose metadata is fully known at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRevision {
    id: String,
    label_name: String,
    timestamp: Option<DateTime<FixedOffset>>,
    context_reference: Option<String>,
    labels: BTreeMap<String, String>,
}

impl StaticRevision {
    pub fn new(id: impl Into<String>, label_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label_name: label_name.into(),
            timestamp: None,
            context_reference: None,
            labels: BTreeMap::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_context_reference(mut self, reference: impl Into<String>) -> Self {
        self.context_reference = Some(reference.into());
        self
    }

    pub fn with_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }
}

impl Revision for StaticRevision {
    fn as_string(&self) -> &str {
        &self.id
    }

    fn label_name(&self) -> &str {
        &self.label_name
    }

    fn read_timestamp(&self) -> Result<Option<DateTime<FixedOffset>>> {
        Ok(self.timestamp)
    }

    fn context_reference(&self) -> Option<&str> {
        self.context_reference.as_deref()
    }

    fn associated_labels(&self) -> BTreeMap<String, String> {
        self.labels.clone()
    }
}

/// Serializable snapshot of a revision and its provenance.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RevisionInfo {
    /// Stable identifier, see [`Revision::as_string`].
    pub revision: String,
    /// Commit-message label name.
    pub label_name: String,
    /// Submission time, when the backend tracks it.
    pub timestamp: Option<DateTime<FixedOffset>>,
    /// Reference the revision was resolved from.
    pub context_reference: Option<String>,
    /// Labels attached to exactly this revision.
    pub labels: BTreeMap<String, String>,
}

impl RevisionInfo {
    /// Read every accessor of `revision` once. Fails if the timestamp cannot be read.
    pub fn capture(revision: &dyn Revision) -> Result<Self> {
        Ok(Self {
            revision: revision.as_string().to_string(),
            label_name: revision.label_name().to_string(),
            timestamp: revision.read_timestamp()?,
            context_reference: revision.context_reference().map(str::to_string),
            labels: revision.associated_labels(),
        })
    }
}

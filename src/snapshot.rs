//! Version snapshots of result records.
//!
//! Every save that changes a versioned field appends a [`VersionSnapshot`]
//! holding the full record as of that save. Snapshots are never deleted;
//! the only mutation ever applied to one is a [`SnapshotPatch`] overwrite
//! of its payload fields when a lower attempt is reconciled in place.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::result::{OutcomeResult, ResultId};

/// Unique identifier for a version snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(Uuid);

impl SnapshotId {
    /// Creates a new random snapshot ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a snapshot ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One saved version of a result record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSnapshot {
    /// Unique snapshot ID.
    pub id: SnapshotId,
    /// The record this snapshot belongs to.
    pub result: ResultId,
    /// 1-based version ordinal, strictly increasing per record. Assigned by
    /// the store at append and never rewritten.
    pub version: u64,
    /// When the snapshot was appended. Never rewritten.
    pub created_at: DateTime<Utc>,
    /// The full record as of the save that produced this snapshot.
    pub record: OutcomeResult,
}

impl VersionSnapshot {
    /// Creates a snapshot of `record` at the given version ordinal, stamped
    /// with the current time.
    #[must_use]
    pub fn new(result: ResultId, version: u64, record: OutcomeResult) -> Self {
        Self {
            id: SnapshotId::new(),
            result,
            version,
            created_at: Utc::now(),
            record,
        }
    }

    /// The attempt number recorded in this snapshot, if any.
    #[must_use]
    pub const fn attempt(&self) -> Option<u32> {
        self.record.attempt
    }

    /// Overwrites the snapshot's payload fields from a patch.
    ///
    /// Touches exactly `score`, `mastery`, `possible`, `attempt`, and
    /// `title`; everything else in the snapshot, including `version` and
    /// `created_at`, stays as appended.
    pub fn apply_patch(&mut self, patch: &SnapshotPatch) {
        self.record.score = patch.score;
        self.record.mastery = patch.mastery;
        self.record.possible = patch.possible;
        self.record.attempt = patch.attempt;
        self.record.title = patch.title.clone();
    }
}

/// The payload fields an in-place snapshot patch overwrites.
///
/// Fields are `Option` because the live record's are: a patch assigns the
/// live values verbatim, unset included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPatch {
    /// Replacement score.
    pub score: Option<Decimal>,
    /// Replacement mastery flag.
    pub mastery: Option<bool>,
    /// Replacement points possible.
    pub possible: Option<Decimal>,
    /// Replacement attempt number.
    pub attempt: Option<u32>,
    /// Replacement title.
    pub title: Option<String>,
}

impl SnapshotPatch {
    /// Captures the patchable payload fields from a live record.
    #[must_use]
    pub fn from_record(record: &OutcomeResult) -> Self {
        Self {
            score: record.score,
            mastery: record.mastery,
            possible: record.possible,
            attempt: record.attempt,
            title: record.title.clone(),
        }
    }
}

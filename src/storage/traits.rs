//! Abstract storage trait for the result ledger.
//!
//! The trait defines the contract a versioned result store must implement.
//! By using a trait, we enable:
//! - In-memory backends for testing and embedded use
//! - Relational backends for production
//! - The reconciler to stay storage-agnostic

use thiserror::Error;

use crate::query::{ResultFilter, ResultOrdering};
use crate::result::{OutcomeResult, ResultId};
use crate::snapshot::{SnapshotId, SnapshotPatch, VersionSnapshot};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Result record not found.
    #[error("Result not found: {0}")]
    ResultNotFound(ResultId),

    /// Version snapshot not found.
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(SnapshotId),

    /// Key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Connection failed.
    #[error("Connection error: {0}")]
    Connection(String),
}

/// What an [`VersionedStore::append_snapshot`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The record was written and a snapshot appended at this version.
    Appended {
        /// The 1-based ordinal of the new snapshot.
        version: u64,
    },

    /// The record was written but no versioned field changed, so the
    /// history was left alone.
    Skipped,
}

impl AppendOutcome {
    /// True when a snapshot was appended.
    #[must_use]
    pub const fn appended(&self) -> bool {
        matches!(self, Self::Appended { .. })
    }
}

/// Storage trait for versioned result records.
///
/// # Versioning contract
/// - Every appended snapshot gets the next 1-based version ordinal for its
///   record and a creation timestamp; neither is ever rewritten.
/// - Snapshots are never deleted. The only mutation ever applied to one is
///   [`VersionedStore::update_snapshot_payload`].
/// - Writes to a single record's history must be serialized by the
///   implementation (lock, row lock, or optimistic concurrency).
pub trait VersionedStore: Send + Sync {
    /// Get the live record by ID.
    fn get(&self, id: ResultId) -> Result<Option<OutcomeResult>, StorageError>;

    /// The most recently appended snapshot for a record, if any.
    fn latest_snapshot(&self, id: ResultId) -> Result<Option<VersionSnapshot>, StorageError>;

    /// All snapshots whose recorded attempt equals `attempt`, most recently
    /// appended first.
    fn snapshots_with_attempt(
        &self,
        id: ResultId,
        attempt: u32,
    ) -> Result<Vec<VersionSnapshot>, StorageError>;

    /// All snapshots for a record, ascending by version.
    fn list_snapshots(&self, id: ResultId) -> Result<Vec<VersionSnapshot>, StorageError>;

    /// Write the live record and append a version snapshot of it.
    ///
    /// The snapshot is appended when the record is new to the store, or
    /// when any field other than `updated_at` differs from the stored
    /// record. A write that only moved `updated_at` still replaces the
    /// stored record but reports [`AppendOutcome::Skipped`].
    fn append_snapshot(&self, record: &OutcomeResult) -> Result<AppendOutcome, StorageError>;

    /// Overwrite the payload fields of one stored snapshot in place.
    ///
    /// Touches exactly score/mastery/possible/attempt/title; `version` and
    /// `created_at` stay as appended. The live record is not written.
    fn update_snapshot_payload(
        &self,
        id: SnapshotId,
        patch: &SnapshotPatch,
    ) -> Result<(), StorageError>;

    /// Find live records matching a filter, sorted under an ordering.
    fn find_results(
        &self,
        filter: &ResultFilter,
        ordering: ResultOrdering,
    ) -> Result<Vec<OutcomeResult>, StorageError>;
}

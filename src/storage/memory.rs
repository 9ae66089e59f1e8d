//! In-memory storage backend.
//!
//! This module provides a thread-safe in-memory implementation of the
//! versioned store. It is intended for embedded usage, tests, and as a
//! reference implementation of the versioning contract.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use tracing::debug;

use crate::query::{ResultFilter, ResultOrdering};
use crate::result::{OutcomeResult, ResultId};
use crate::snapshot::{SnapshotId, SnapshotPatch, VersionSnapshot};
use crate::storage::traits::{AppendOutcome, StorageError, VersionedStore};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::Backend(format!("poisoned lock: {context}"))
}

#[derive(Debug, Default)]
struct LedgerState {
    records: HashMap<ResultId, OutcomeResult>,
    histories: HashMap<ResultId, BTreeMap<u64, VersionSnapshot>>,
    snapshot_index: HashMap<SnapshotId, (ResultId, u64)>,
}

/// Thread-safe in-memory versioned result store.
///
/// All access goes through one `RwLock`, so writes to a record's history
/// are serialized, satisfying the per-record write contract.
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    state: RwLock<LedgerState>,
}

impl InMemoryResultStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records in the store.
    ///
    /// # Errors
    /// Returns an error if the state lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("result.len"))?;
        Ok(state.records.len())
    }

    /// True when the store holds no records.
    ///
    /// # Errors
    /// Returns an error if the state lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

impl VersionedStore for InMemoryResultStore {
    fn get(&self, id: ResultId) -> Result<Option<OutcomeResult>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("result.get"))?;
        Ok(state.records.get(&id).cloned())
    }

    fn latest_snapshot(&self, id: ResultId) -> Result<Option<VersionSnapshot>, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| lock_err("result.latest_snapshot"))?;
        Ok(state
            .histories
            .get(&id)
            .and_then(|history| history.last_key_value())
            .map(|(_, snapshot)| snapshot.clone()))
    }

    fn snapshots_with_attempt(
        &self,
        id: ResultId,
        attempt: u32,
    ) -> Result<Vec<VersionSnapshot>, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| lock_err("result.snapshots_with_attempt"))?;
        let Some(history) = state.histories.get(&id) else {
            return Ok(Vec::new());
        };
        Ok(history
            .values()
            .rev()
            .filter(|snapshot| snapshot.attempt() == Some(attempt))
            .cloned()
            .collect())
    }

    fn list_snapshots(&self, id: ResultId) -> Result<Vec<VersionSnapshot>, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| lock_err("result.list_snapshots"))?;
        Ok(state
            .histories
            .get(&id)
            .map(|history| history.values().cloned().collect())
            .unwrap_or_default())
    }

    fn append_snapshot(&self, record: &OutcomeResult) -> Result<AppendOutcome, StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| lock_err("result.append_snapshot"))?;

        let differs = match state.records.get(&record.id) {
            None => true,
            Some(stored) => stored.versioned_fields_differ(record),
        };
        state.records.insert(record.id, record.clone());
        if !differs {
            debug!(result = %record.id, "record written without versioned changes, snapshot skipped");
            return Ok(AppendOutcome::Skipped);
        }

        let version = state
            .histories
            .get(&record.id)
            .and_then(|history| history.last_key_value())
            .map_or(0, |(version, _)| *version)
            + 1;
        let snapshot = VersionSnapshot::new(record.id, version, record.clone());
        state.snapshot_index.insert(snapshot.id, (record.id, version));
        state
            .histories
            .entry(record.id)
            .or_default()
            .insert(version, snapshot);

        debug!(result = %record.id, version, "appended result snapshot");
        Ok(AppendOutcome::Appended { version })
    }

    fn update_snapshot_payload(
        &self,
        id: SnapshotId,
        patch: &SnapshotPatch,
    ) -> Result<(), StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| lock_err("result.update_snapshot_payload"))?;

        let (result_id, version) = state
            .snapshot_index
            .get(&id)
            .copied()
            .ok_or(StorageError::SnapshotNotFound(id))?;
        let snapshot = state
            .histories
            .get_mut(&result_id)
            .and_then(|history| history.get_mut(&version))
            .ok_or(StorageError::SnapshotNotFound(id))?;
        snapshot.apply_patch(patch);

        debug!(snapshot = %id, result = %result_id, version, "patched snapshot payload in place");
        Ok(())
    }

    fn find_results(
        &self,
        filter: &ResultFilter,
        ordering: ResultOrdering,
    ) -> Result<Vec<OutcomeResult>, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| lock_err("result.find_results"))?;
        let mut results: Vec<OutcomeResult> = state
            .records
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        ordering.sort(&mut results);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::{
        AssignmentId, AssociationRef, ContentTagId, ContextRef, CourseId, OutcomeId, UserId,
    };
    use crate::result::Alignment;
    use rust_decimal::Decimal;

    fn sample_record() -> OutcomeResult {
        OutcomeResult::new(
            UserId::new(),
            Alignment::new(ContentTagId::new(), OutcomeId::new()),
            AssociationRef::assignment(AssignmentId::new()),
        )
    }

    #[test]
    fn test_append_assigns_increasing_versions() {
        let store = InMemoryResultStore::new();
        let mut record = sample_record().with_attempt(1).with_score(Decimal::ONE);

        let first = store.append_snapshot(&record).unwrap();
        assert_eq!(first, AppendOutcome::Appended { version: 1 });

        record.score = Some(Decimal::from(2));
        let second = store.append_snapshot(&record).unwrap();
        assert_eq!(second, AppendOutcome::Appended { version: 2 });

        let snapshots = store.list_snapshots(record.id).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].version, 1);
        assert_eq!(snapshots[1].version, 2);
    }

    #[test]
    fn test_append_skips_snapshot_for_timestamp_only_write() {
        let store = InMemoryResultStore::new();
        let mut record = sample_record().with_score(Decimal::ONE);
        store.append_snapshot(&record).unwrap();

        record.touch();
        let outcome = store.append_snapshot(&record).unwrap();
        assert_eq!(outcome, AppendOutcome::Skipped);
        assert_eq!(store.list_snapshots(record.id).unwrap().len(), 1);

        // The live record still took the write.
        let stored = store.get(record.id).unwrap().unwrap();
        assert_eq!(stored.updated_at, record.updated_at);
    }

    #[test]
    fn test_get_returns_latest_live_record() {
        let store = InMemoryResultStore::new();
        let mut record = sample_record().with_score(Decimal::ONE);
        store.append_snapshot(&record).unwrap();

        record.score = Some(Decimal::from(5));
        store.append_snapshot(&record).unwrap();

        let stored = store.get(record.id).unwrap().unwrap();
        assert_eq!(stored.score, Some(Decimal::from(5)));
        assert!(store.get(ResultId::new()).unwrap().is_none());
    }

    #[test]
    fn test_latest_snapshot_is_most_recent() {
        let store = InMemoryResultStore::new();
        let mut record = sample_record().with_attempt(1);
        store.append_snapshot(&record).unwrap();
        record.attempt = Some(2);
        store.append_snapshot(&record).unwrap();

        let latest = store.latest_snapshot(record.id).unwrap().unwrap();
        assert_eq!(latest.version, 2);
        assert_eq!(latest.attempt(), Some(2));

        assert!(store.latest_snapshot(ResultId::new()).unwrap().is_none());
    }

    #[test]
    fn test_snapshots_with_attempt_most_recent_first() {
        let store = InMemoryResultStore::new();
        let mut record = sample_record().with_attempt(1).with_score(Decimal::ONE);
        store.append_snapshot(&record).unwrap();

        record.score = Some(Decimal::from(2));
        store.append_snapshot(&record).unwrap();

        record.attempt = Some(2);
        store.append_snapshot(&record).unwrap();

        let matching = store.snapshots_with_attempt(record.id, 1).unwrap();
        assert_eq!(matching.len(), 2);
        assert_eq!(matching[0].version, 2);
        assert_eq!(matching[1].version, 1);

        assert!(store.snapshots_with_attempt(record.id, 7).unwrap().is_empty());
        assert!(store.snapshots_with_attempt(ResultId::new(), 1).unwrap().is_empty());
    }

    #[test]
    fn test_update_snapshot_payload_patches_in_place() {
        let store = InMemoryResultStore::new();
        let record = sample_record()
            .with_attempt(1)
            .with_score(Decimal::ONE)
            .with_title("before");
        store.append_snapshot(&record).unwrap();

        let snapshot = store.latest_snapshot(record.id).unwrap().unwrap();
        let created_at = snapshot.created_at;

        let replacement = record
            .clone()
            .with_score(Decimal::from(9))
            .with_title("after");
        store
            .update_snapshot_payload(snapshot.id, &SnapshotPatch::from_record(&replacement))
            .unwrap();

        let patched = store.latest_snapshot(record.id).unwrap().unwrap();
        assert_eq!(patched.id, snapshot.id);
        assert_eq!(patched.version, snapshot.version);
        assert_eq!(patched.created_at, created_at);
        assert_eq!(patched.record.score, Some(Decimal::from(9)));
        assert_eq!(patched.record.title.as_deref(), Some("after"));

        // The live record is not written by a payload patch.
        let live = store.get(record.id).unwrap().unwrap();
        assert_eq!(live.score, Some(Decimal::ONE));
        assert_eq!(live.title.as_deref(), Some("before"));
    }

    #[test]
    fn test_update_snapshot_payload_unknown_snapshot() {
        let store = InMemoryResultStore::new();
        let record = sample_record();

        let err = store
            .update_snapshot_payload(SnapshotId::new(), &SnapshotPatch::from_record(&record))
            .unwrap_err();
        assert!(matches!(err, StorageError::SnapshotNotFound(_)));
    }

    #[test]
    fn test_histories_are_per_record() {
        let store = InMemoryResultStore::new();
        let first = sample_record().with_attempt(1);
        let second = sample_record().with_attempt(1);
        store.append_snapshot(&first).unwrap();
        store.append_snapshot(&second).unwrap();

        assert_eq!(store.list_snapshots(first.id).unwrap().len(), 1);
        assert_eq!(store.list_snapshots(second.id).unwrap().len(), 1);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_find_results_filters_and_orders() {
        let store = InMemoryResultStore::new();
        let user = UserId::new();
        let course = CourseId::new();

        let mut low = OutcomeResult::new(
            user,
            Alignment::new(ContentTagId::new(), OutcomeId::new()),
            AssociationRef::assignment(AssignmentId::new()),
        )
        .with_context(ContextRef::course(course))
        .with_score(Decimal::from(2));
        low.apply_defaults();
        store.append_snapshot(&low).unwrap();

        let mut high = OutcomeResult::new(
            user,
            Alignment::new(ContentTagId::new(), OutcomeId::new()),
            AssociationRef::assignment(AssignmentId::new()),
        )
        .with_context(ContextRef::course(course))
        .with_score(Decimal::from(8));
        high.apply_defaults();
        store.append_snapshot(&high).unwrap();

        let other_user = sample_record().with_score(Decimal::from(10));
        store.append_snapshot(&other_user).unwrap();

        let found = store
            .find_results(
                &ResultFilter::new().for_user(user),
                ResultOrdering::Highest,
            )
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, high.id);
        assert_eq!(found[1].id, low.id);
    }

    #[test]
    fn test_is_empty() {
        let store = InMemoryResultStore::new();
        assert!(store.is_empty().unwrap());

        store.append_snapshot(&sample_record()).unwrap();
        assert!(!store.is_empty().unwrap());
    }
}

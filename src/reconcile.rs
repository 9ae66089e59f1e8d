//! Attempt-aware reconciliation of incoming scores.
//!
//! This module provides the save decision at the heart of the ledger:
//! whether an incoming observation becomes a new version snapshot or is
//! patched into the existing snapshot(s) recorded for the same attempt.
//! An observation for the current attempt or a newer one moves the record
//! forward; a late-arriving observation for an earlier attempt corrects
//! history in place without disturbing anything recorded since.

use std::sync::Arc;

use tracing::debug;

use crate::error::LedgerResult;
use crate::observation::Observation;
use crate::result::OutcomeResult;
use crate::snapshot::{SnapshotPatch, VersionSnapshot};
use crate::storage::{AppendOutcome, VersionedStore};

/// Result of a reconciliation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The record was saved through the forward path.
    Saved {
        /// What the store did with the version history.
        snapshot: AppendOutcome,
    },

    /// Snapshot(s) already recorded for the incoming attempt were patched
    /// in place. The live record was not saved.
    Patched {
        /// How many snapshots received the payload overwrite.
        snapshots_updated: usize,
    },
}

impl ReconcileOutcome {
    /// True when the call went through the forward save path.
    #[must_use]
    pub const fn saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Applies the attempt-aware save decision against a versioned store.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn VersionedStore>,
}

impl Reconciler {
    /// Create a new reconciler over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn VersionedStore>) -> Self {
        Self { store }
    }

    /// The store this reconciler writes through.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn VersionedStore> {
        &self.store
    }

    /// Save the record through the forward path.
    ///
    /// Runs the before-save normalization, validates, stamps `updated_at`,
    /// and writes the record. The store appends a snapshot unless nothing
    /// besides the timestamp changed.
    ///
    /// # Errors
    ///
    /// Returns a validation error without writing anything, or a storage
    /// error propagated unchanged from the store.
    pub fn save(&self, record: &mut OutcomeResult) -> LedgerResult<AppendOutcome> {
        record.apply_defaults();
        record.validate()?;
        record.touch();
        Ok(self.store.append_snapshot(record)?)
    }

    /// Reconcile the record against an incoming attempt number.
    ///
    /// The forward case saves the record as the newest version: it applies
    /// when the record has no snapshots yet, when the current snapshot's
    /// attempt is undefined, or when `incoming_attempt` is at least the
    /// current one. Only a strictly lower incoming attempt reaches back:
    /// every snapshot recorded for that attempt is overwritten in place
    /// with the record's current score/mastery/possible/attempt/title, the
    /// history keeps its length and order, and the live record is not
    /// saved. When no snapshot carries the incoming attempt, the call falls
    /// back to the forward case.
    ///
    /// # Errors
    ///
    /// Returns a validation error from the forward path, or a storage error
    /// propagated unchanged; a storage failure aborts the call.
    pub fn reconcile(
        &self,
        record: &mut OutcomeResult,
        incoming_attempt: u32,
    ) -> LedgerResult<ReconcileOutcome> {
        let latest = self.store.latest_snapshot(record.id)?;
        let current_attempt = latest.as_ref().and_then(VersionSnapshot::attempt);

        if let Some(current) = current_attempt {
            if incoming_attempt < current {
                return self.patch_attempt(record, incoming_attempt, current);
            }
        }

        debug!(
            result = %record.id,
            incoming = incoming_attempt,
            current = ?current_attempt,
            "saving forward"
        );
        let snapshot = self.save(record)?;
        Ok(ReconcileOutcome::Saved { snapshot })
    }

    /// Record an observation: apply it to the record, then reconcile on its
    /// attempt number.
    ///
    /// # Errors
    ///
    /// Same as [`Reconciler::reconcile`].
    pub fn record(
        &self,
        record: &mut OutcomeResult,
        observation: &Observation,
    ) -> LedgerResult<ReconcileOutcome> {
        record.apply_observation(observation);
        self.reconcile(record, observation.attempt)
    }

    fn patch_attempt(
        &self,
        record: &mut OutcomeResult,
        incoming_attempt: u32,
        current_attempt: u32,
    ) -> LedgerResult<ReconcileOutcome> {
        let matching = self
            .store
            .snapshots_with_attempt(record.id, incoming_attempt)?;
        if matching.is_empty() {
            debug!(
                result = %record.id,
                incoming = incoming_attempt,
                current = current_attempt,
                "no snapshots recorded for attempt, saving forward"
            );
            let snapshot = self.save(record)?;
            return Ok(ReconcileOutcome::Saved { snapshot });
        }

        let patch = SnapshotPatch::from_record(record);
        let snapshots_updated = matching.len();
        for snapshot in &matching {
            self.store.update_snapshot_payload(snapshot.id, &patch)?;
        }

        debug!(
            result = %record.id,
            incoming = incoming_attempt,
            current = current_attempt,
            snapshots_updated,
            "patched earlier attempt in place"
        );
        Ok(ReconcileOutcome::Patched { snapshots_updated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LedgerError, ValidationError};
    use crate::observation::ObservationBuilder;
    use crate::query::{ResultFilter, ResultOrdering};
    use crate::refs::{AssignmentId, AssociationRef, ContentTagId, OutcomeId, UserId};
    use crate::result::{Alignment, ResultId};
    use crate::snapshot::SnapshotId;
    use crate::storage::{InMemoryResultStore, StorageError};
    use rust_decimal::Decimal;

    fn reconciler() -> (Reconciler, Arc<InMemoryResultStore>) {
        let store = Arc::new(InMemoryResultStore::new());
        (Reconciler::new(store.clone()), store)
    }

    fn sample_record() -> OutcomeResult {
        OutcomeResult::new(
            UserId::new(),
            Alignment::new(ContentTagId::new(), OutcomeId::new()),
            AssociationRef::assignment(AssignmentId::new()),
        )
    }

    #[test]
    fn test_empty_history_saves_forward() {
        let (reconciler, store) = reconciler();
        let mut record = sample_record().with_attempt(1).with_score(Decimal::ONE);

        let outcome = reconciler.reconcile(&mut record, 1).unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Saved {
                snapshot: AppendOutcome::Appended { version: 1 }
            }
        );
        assert_eq!(store.list_snapshots(record.id).unwrap().len(), 1);
    }

    #[test]
    fn test_equal_attempt_saves_forward() {
        let (reconciler, store) = reconciler();
        let mut record = sample_record().with_attempt(2).with_score(Decimal::ONE);
        reconciler.reconcile(&mut record, 2).unwrap();

        record.score = Some(Decimal::from(5));
        let outcome = reconciler.reconcile(&mut record, 2).unwrap();
        assert!(outcome.saved());
        assert_eq!(store.list_snapshots(record.id).unwrap().len(), 2);
    }

    #[test]
    fn test_undefined_current_attempt_saves_forward() {
        let (reconciler, store) = reconciler();
        let mut record = sample_record().with_score(Decimal::ONE);
        reconciler.save(&mut record).unwrap();

        record.attempt = Some(1);
        record.score = Some(Decimal::from(3));
        let outcome = reconciler.reconcile(&mut record, 1).unwrap();
        assert!(outcome.saved());
        assert_eq!(store.list_snapshots(record.id).unwrap().len(), 2);
    }

    #[test]
    fn test_lower_attempt_patches_matching_snapshots() {
        let (reconciler, store) = reconciler();
        let mut record = sample_record().with_attempt(1).with_score(Decimal::ONE);
        reconciler.reconcile(&mut record, 1).unwrap();

        record.attempt = Some(2);
        record.score = Some(Decimal::from(2));
        reconciler.reconcile(&mut record, 2).unwrap();

        record.attempt = Some(1);
        record.score = Some(Decimal::from(9));
        let outcome = reconciler.reconcile(&mut record, 1).unwrap();
        assert_eq!(outcome, ReconcileOutcome::Patched { snapshots_updated: 1 });

        let snapshots = store.list_snapshots(record.id).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].record.score, Some(Decimal::from(9)));
        assert_eq!(snapshots[0].attempt(), Some(1));
        assert_eq!(snapshots[1].record.score, Some(Decimal::from(2)));
    }

    #[test]
    fn test_patch_does_not_save_live_record() {
        let (reconciler, store) = reconciler();
        let mut record = sample_record().with_attempt(1).with_score(Decimal::ONE);
        reconciler.reconcile(&mut record, 1).unwrap();
        record.attempt = Some(3);
        record.score = Some(Decimal::from(3));
        reconciler.reconcile(&mut record, 3).unwrap();

        record.attempt = Some(1);
        record.score = Some(Decimal::from(7));
        reconciler.reconcile(&mut record, 1).unwrap();

        let live = store.get(record.id).unwrap().unwrap();
        assert_eq!(live.score, Some(Decimal::from(3)));
        assert_eq!(live.attempt, Some(3));
    }

    #[test]
    fn test_lower_attempt_without_matching_snapshot_falls_back() {
        let (reconciler, store) = reconciler();
        let mut record = sample_record().with_attempt(5).with_score(Decimal::ONE);
        reconciler.reconcile(&mut record, 5).unwrap();

        record.attempt = Some(2);
        record.score = Some(Decimal::from(4));
        let outcome = reconciler.reconcile(&mut record, 2).unwrap();
        assert!(outcome.saved());

        let snapshots = store.list_snapshots(record.id).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[1].attempt(), Some(2));
    }

    #[test]
    fn test_record_applies_observation_then_reconciles() {
        let (reconciler, store) = reconciler();
        let mut record = sample_record();

        let observation = ObservationBuilder::new()
            .attempt(1)
            .score(Decimal::from(6))
            .possible(Decimal::from(10))
            .build()
            .unwrap();
        let outcome = reconciler.record(&mut record, &observation).unwrap();
        assert!(outcome.saved());

        let stored = store.get(record.id).unwrap().unwrap();
        assert_eq!(stored.attempt, Some(1));
        assert_eq!(stored.score, Some(Decimal::from(6)));
        assert_eq!(stored.percent, Some(Decimal::new(6, 1)));
        assert!(stored.assessed_at.is_some());
    }

    #[test]
    fn test_save_validation_failure_writes_nothing() {
        let (reconciler, store) = reconciler();
        let mut record = sample_record().with_attempt(0);

        let err = reconciler.save(&mut record).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::AttemptOutOfRange { value: 0 })
        ));
        assert!(store.get(record.id).unwrap().is_none());
        assert!(store.list_snapshots(record.id).unwrap().is_empty());
    }

    #[test]
    fn test_save_skips_snapshot_when_nothing_changed() {
        let (reconciler, store) = reconciler();
        let mut record = sample_record().with_attempt(1).with_score(Decimal::ONE);

        let first = reconciler.save(&mut record).unwrap();
        assert!(first.appended());

        let second = reconciler.save(&mut record).unwrap();
        assert_eq!(second, AppendOutcome::Skipped);
        assert_eq!(store.list_snapshots(record.id).unwrap().len(), 1);
    }

    /// Store stub whose every operation fails with a connection error.
    struct DisconnectedStore;

    impl VersionedStore for DisconnectedStore {
        fn get(&self, _id: ResultId) -> Result<Option<OutcomeResult>, StorageError> {
            Err(StorageError::Connection("store offline".to_string()))
        }

        fn latest_snapshot(
            &self,
            _id: ResultId,
        ) -> Result<Option<VersionSnapshot>, StorageError> {
            Err(StorageError::Connection("store offline".to_string()))
        }

        fn snapshots_with_attempt(
            &self,
            _id: ResultId,
            _attempt: u32,
        ) -> Result<Vec<VersionSnapshot>, StorageError> {
            Err(StorageError::Connection("store offline".to_string()))
        }

        fn list_snapshots(&self, _id: ResultId) -> Result<Vec<VersionSnapshot>, StorageError> {
            Err(StorageError::Connection("store offline".to_string()))
        }

        fn append_snapshot(&self, _record: &OutcomeResult) -> Result<AppendOutcome, StorageError> {
            Err(StorageError::Connection("store offline".to_string()))
        }

        fn update_snapshot_payload(
            &self,
            _id: SnapshotId,
            _patch: &SnapshotPatch,
        ) -> Result<(), StorageError> {
            Err(StorageError::Connection("store offline".to_string()))
        }

        fn find_results(
            &self,
            _filter: &ResultFilter,
            _ordering: ResultOrdering,
        ) -> Result<Vec<OutcomeResult>, StorageError> {
            Err(StorageError::Connection("store offline".to_string()))
        }
    }

    #[test]
    fn test_storage_failure_propagates_unchanged() {
        let reconciler = Reconciler::new(Arc::new(DisconnectedStore));
        let mut record = sample_record().with_attempt(1);

        let err = reconciler.reconcile(&mut record, 1).unwrap_err();
        assert!(err.is_storage());
        assert!(err.is_retryable());
        assert!(matches!(
            err,
            LedgerError::Storage(StorageError::Connection(_))
        ));
    }
}

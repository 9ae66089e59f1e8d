//! # outcome-ledger - Versioned outcome results with attempt reconciliation
//!
//! outcome-ledger tracks scored attempts at learning outcomes. Every save of
//! a result record appends a version snapshot, and incoming scores are
//! reconciled against the attempt history: a score for the current attempt
//! or a newer one moves the record forward, while a late-arriving score for
//! an earlier attempt corrects that attempt's snapshot(s) in place without
//! disturbing anything recorded since.
//!
//! ## Core Concepts
//!
//! - **`OutcomeResult`**: one user's standing against one outcome for one
//!   assessed activity
//! - **`VersionSnapshot`**: the full record as of one save, appended in
//!   order and never deleted
//! - **`Observation`**: a scoring report for an attempt number, validated
//!   before it touches storage
//! - **`Reconciler`**: the attempt-aware save decision over a pluggable
//!   [`VersionedStore`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use outcome_ledger::{
//!     Alignment, AssociationRef, ObservationBuilder, OutcomeResult, Reconciler,
//!     InMemoryResultStore,
//! };
//!
//! let reconciler = Reconciler::new(Arc::new(InMemoryResultStore::new()));
//!
//! // A result for one user's outcome, attached to an assignment
//! let mut result = OutcomeResult::new(user, alignment, AssociationRef::assignment(assignment));
//!
//! // Record the second attempt's score
//! let observation = ObservationBuilder::new()
//!     .attempt(2)
//!     .score(score)
//!     .possible(possible)
//!     .build()?;
//! reconciler.record(&mut result, &observation)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod error;
pub mod observation;
pub mod query;
pub mod refs;
pub mod result;
pub mod snapshot;

// Storage and reconciliation
pub mod reconcile;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use error::{LedgerError, LedgerResult, ValidationError};
pub use observation::{Observation, ObservationBuilder};
pub use query::{ContextCodeFilter, ResultFilter, ResultOrdering};
pub use refs::{
    AccountId, ArtifactRef, AssessmentQuestionId, AssetRef, AssignmentId, AssociationRef,
    ContentTagId, ContextRef, CourseId, OutcomeId, QuizId, QuizSubmissionId, RubricAssessmentId,
    RubricAssociationId, SubmissionId, UserId,
};
pub use result::{Alignment, OutcomeResult, ResultId, MAX_TITLE_LENGTH};
pub use snapshot::{SnapshotId, SnapshotPatch, VersionSnapshot};

pub use reconcile::{ReconcileOutcome, Reconciler};
pub use storage::{AppendOutcome, InMemoryResultStore, StorageError, VersionedStore};

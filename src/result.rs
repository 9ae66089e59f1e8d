//! The live outcome result record.
//!
//! An [`OutcomeResult`] is one user's standing against one learning outcome
//! for one assessed activity. The record carries the current values; the
//! per-save history lives in [`crate::snapshot::VersionSnapshot`]s managed
//! by the store.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::observation::Observation;
use crate::refs::{
    ArtifactRef, AssetRef, AssignmentId, AssociationRef, ContentTagId, ContextRef, OutcomeId,
    UserId,
};

/// Maximum stored length of a result title, in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Unique identifier for an outcome result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(Uuid);

impl ResultId {
    /// Creates a new random result ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a result ID from an existing UUID.
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

impl Default for ResultId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The alignment binding an outcome to assessed content.
///
/// The alignment, not the stored column, is the source of truth for which
/// outcome a result tracks: [`OutcomeResult::apply_defaults`] re-derives the
/// record's `outcome` from it on every save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alignment {
    /// The content tag carrying the alignment.
    pub tag: ContentTagId,
    /// The outcome the tag aligns.
    pub outcome: OutcomeId,
}

impl Alignment {
    /// Creates an alignment.
    #[must_use]
    pub const fn new(tag: ContentTagId, outcome: OutcomeId) -> Self {
        Self { tag, outcome }
    }
}

/// One user's scored standing against one outcome for one assessed activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeResult {
    /// Unique record ID.
    pub id: ResultId,
    /// The user the result belongs to.
    pub user: UserId,
    /// The outcome being tracked. Re-derived from `alignment` at every save.
    pub outcome: OutcomeId,
    /// The alignment that produced this result.
    pub alignment: Alignment,
    /// The assessed activity the result is attached to.
    pub association: AssociationRef,
    /// The graded artifact that produced the score, if any.
    pub artifact: Option<ArtifactRef>,
    /// The finer-grained asset the result scores against, if any.
    pub asset: Option<AssetRef>,
    /// The grading context, if known.
    pub context: Option<ContextRef>,
    /// Deterministic context code, derived from `context` at every save.
    pub context_code: Option<String>,
    /// Latest score awarded.
    pub score: Option<Decimal>,
    /// Points possible for the assessed activity.
    pub possible: Option<Decimal>,
    /// `score / possible`, recomputed at every save; unset when not derivable.
    pub percent: Option<Decimal>,
    /// Whether the latest score demonstrates mastery.
    pub mastery: Option<bool>,
    /// Attempt number of the latest assessment, 1-based.
    pub attempt: Option<u32>,
    /// Score from the first assessment, frozen once set.
    pub original_score: Option<Decimal>,
    /// Points possible at the first assessment, frozen once set.
    pub original_possible: Option<Decimal>,
    /// Mastery from the first assessment, frozen once set.
    pub original_mastery: Option<bool>,
    /// Display title for the result.
    pub title: Option<String>,
    /// When the underlying work was assessed.
    pub assessed_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last written. The one field a save may change
    /// without warranting a new version snapshot.
    pub updated_at: DateTime<Utc>,
}

impl OutcomeResult {
    /// Creates a new result for a user, aligned outcome, and assessed
    /// activity. All scoring fields start unset.
    #[must_use]
    pub fn new(user: UserId, alignment: Alignment, association: AssociationRef) -> Self {
        let now = Utc::now();
        Self {
            id: ResultId::new(),
            user,
            outcome: alignment.outcome,
            alignment,
            association,
            artifact: None,
            asset: None,
            context: None,
            context_code: None,
            score: None,
            possible: None,
            percent: None,
            mastery: None,
            attempt: None,
            original_score: None,
            original_possible: None,
            original_mastery: None,
            title: None,
            assessed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the grading context.
    #[must_use]
    pub fn with_context(mut self, context: ContextRef) -> Self {
        self.context = Some(context);
        self
    }

    /// Sets the graded artifact.
    #[must_use]
    pub fn with_artifact(mut self, artifact: ArtifactRef) -> Self {
        self.artifact = Some(artifact);
        self
    }

    /// Sets the associated asset.
    #[must_use]
    pub fn with_asset(mut self, asset: AssetRef) -> Self {
        self.asset = Some(asset);
        self
    }

    /// Sets the score.
    #[must_use]
    pub fn with_score(mut self, score: Decimal) -> Self {
        self.score = Some(score);
        self
    }

    /// Sets the points possible.
    #[must_use]
    pub fn with_possible(mut self, possible: Decimal) -> Self {
        self.possible = Some(possible);
        self
    }

    /// Sets the mastery flag.
    #[must_use]
    pub fn with_mastery(mut self, mastery: bool) -> Self {
        self.mastery = Some(mastery);
        self
    }

    /// Sets the attempt number.
    #[must_use]
    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    /// Sets the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the assessment time.
    #[must_use]
    pub fn with_assessed_at(mut self, assessed_at: DateTime<Utc>) -> Self {
        self.assessed_at = Some(assessed_at);
        self
    }

    /// Normalizes derived fields before a save.
    ///
    /// Re-derives `outcome` from the alignment and `context_code` from the
    /// context, freezes the `original_*` fields on first assignment, and
    /// recomputes `percent`. A percent that cannot be derived (missing
    /// operand, zero `possible`, unrepresentable quotient) is unset, never
    /// an error.
    pub fn apply_defaults(&mut self) {
        self.outcome = self.alignment.outcome;
        self.context_code = self.context.as_ref().map(ContextRef::code);
        if self.original_score.is_none() {
            self.original_score = self.score;
        }
        if self.original_possible.is_none() {
            self.original_possible = self.possible;
        }
        if self.original_mastery.is_none() {
            self.original_mastery = self.mastery;
        }
        self.percent = self.derived_percent();
    }

    fn derived_percent(&self) -> Option<Decimal> {
        let score = self.score?;
        let possible = self.possible?;
        if possible.is_zero() {
            return None;
        }
        score.checked_div(possible)
    }

    /// Validates the record before persistence.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a zero attempt number, a negative
    /// score or points-possible, or a title over [`MAX_TITLE_LENGTH`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(attempt) = self.attempt {
            if attempt == 0 {
                return Err(ValidationError::AttemptOutOfRange { value: attempt });
            }
        }
        if let Some(score) = self.score {
            if score < Decimal::ZERO {
                return Err(ValidationError::NegativeValue {
                    field: "score".to_string(),
                    value: score,
                });
            }
        }
        if let Some(possible) = self.possible {
            if possible < Decimal::ZERO {
                return Err(ValidationError::NegativeValue {
                    field: "possible".to_string(),
                    value: possible,
                });
            }
        }
        if let Some(title) = &self.title {
            if title.chars().count() > MAX_TITLE_LENGTH {
                return Err(ValidationError::FieldTooLong {
                    field: "title".to_string(),
                    max_length: MAX_TITLE_LENGTH,
                });
            }
        }
        Ok(())
    }

    /// True when any field other than `updated_at` differs from `other`.
    ///
    /// Drives the snapshot decision: a save that only touched `updated_at`
    /// does not warrant a new version.
    #[must_use]
    pub fn versioned_fields_differ(&self, other: &Self) -> bool {
        let mut normalized = other.clone();
        normalized.updated_at = self.updated_at;
        *self != normalized
    }

    /// The assignment this result scores, when one can be resolved.
    ///
    /// Resolves through the association when it is an assignment, otherwise
    /// through a rubric-assessment artifact that recorded its assignment.
    #[must_use]
    pub fn assignment_id(&self) -> Option<AssignmentId> {
        self.association
            .assignment_id()
            .or_else(|| self.artifact.as_ref().and_then(ArtifactRef::assignment_id))
    }

    /// Copies a scoring observation onto the live record.
    ///
    /// Payload fields (`score`, `possible`, `mastery`, `attempt`) take the
    /// observation's values; the title is only replaced when the observation
    /// carries one. `assessed_at` is stamped with the observation's time, or
    /// now when the observation has none.
    pub fn apply_observation(&mut self, observation: &Observation) {
        self.score = observation.score;
        self.possible = observation.possible;
        self.mastery = observation.mastery;
        if let Some(title) = &observation.title {
            self.title = Some(title.clone());
        }
        self.attempt = Some(observation.attempt);
        self.assessed_at = Some(observation.assessed_at.unwrap_or_else(Utc::now));
        self.touch();
    }

    /// Stamps `updated_at` with the current time.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

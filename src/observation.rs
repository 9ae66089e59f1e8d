//! Scoring observation intake.
//!
//! The ObservationBuilder provides a fluent, validating API for constructing
//! the "(score, mastery, possible, title) at attempt N" reports the
//! assessment layer hands to the reconciler. All validation happens before
//! anything touches storage.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::result::MAX_TITLE_LENGTH;

/// One scoring observation for a result, reported against an attempt number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// The attempt number the observation was scored against, 1-based.
    pub attempt: u32,
    /// Score awarded, if any.
    pub score: Option<Decimal>,
    /// Points possible, if known.
    pub possible: Option<Decimal>,
    /// Whether the score demonstrates mastery, if judged.
    pub mastery: Option<bool>,
    /// Replacement display title, if any.
    pub title: Option<String>,
    /// When the work was assessed; the receiving record stamps "now" when
    /// unset.
    pub assessed_at: Option<DateTime<Utc>>,
}

/// Builder for scoring observations.
///
/// # Example
/// ```rust,ignore
/// let observation = ObservationBuilder::new()
///     .attempt(2)
///     .score(Decimal::from(7))
///     .possible(Decimal::from(10))
///     .mastery(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ObservationBuilder {
    attempt: Option<u32>,
    score: Option<Decimal>,
    possible: Option<Decimal>,
    mastery: Option<bool>,
    title: Option<String>,
    assessed_at: Option<DateTime<Utc>>,
}

impl ObservationBuilder {
    /// Creates a new builder with no fields set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attempt number (required, must be at least 1).
    #[must_use]
    pub fn attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    /// Set the score awarded (optional).
    #[must_use]
    pub fn score(mut self, score: Decimal) -> Self {
        self.score = Some(score);
        self
    }

    /// Set the points possible (optional).
    #[must_use]
    pub fn possible(mut self, possible: Decimal) -> Self {
        self.possible = Some(possible);
        self
    }

    /// Set the mastery judgement (optional).
    #[must_use]
    pub fn mastery(mut self, mastery: bool) -> Self {
        self.mastery = Some(mastery);
        self
    }

    /// Set a replacement title (optional).
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set when the work was assessed (optional).
    #[must_use]
    pub fn assessed_at(mut self, assessed_at: DateTime<Utc>) -> Self {
        self.assessed_at = Some(assessed_at);
        self
    }

    /// Build the observation.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` if no attempt was set,
    /// `ValidationError::AttemptOutOfRange` for attempt zero,
    /// `ValidationError::NegativeValue` for a negative score or
    /// points-possible, and `ValidationError::FieldTooLong` for a title over
    /// [`MAX_TITLE_LENGTH`].
    pub fn build(self) -> Result<Observation, ValidationError> {
        let attempt = self.attempt.ok_or_else(|| ValidationError::MissingField {
            field: "attempt".to_string(),
        })?;
        if attempt == 0 {
            return Err(ValidationError::AttemptOutOfRange { value: attempt });
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

        Ok(Observation {
            attempt,
            score: self.score,
            possible: self.possible,
            mastery: self.mastery,
            title: self.title,
            assessed_at: self.assessed_at,
        })
    }
}

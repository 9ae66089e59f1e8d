//! Error types for the outcome ledger.
//!
//! All errors are strongly typed using thiserror. The split mirrors how
//! callers need to react: validation failures are recoverable (fix the
//! input, retry the request), storage failures are fatal for the current
//! save and propagate unchanged.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::storage::StorageError;

/// Validation errors raised before anything touches storage.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field was not set.
    #[error("Required field '{field}' is missing")]
    MissingField {
        /// Name of the missing field.
        field: String,
    },

    /// A field exceeds its maximum stored length.
    #[error("Field '{field}' exceeds maximum length of {max_length}")]
    FieldTooLong {
        /// Name of the oversized field.
        field: String,
        /// The maximum accepted length.
        max_length: usize,
    },

    /// An attempt number outside the accepted range.
    #[error("Attempt number {value} is out of range (attempts are 1-based)")]
    AttemptOutOfRange {
        /// The rejected attempt number.
        value: u32,
    },

    /// A value that must be non-negative was negative.
    #[error("Field '{field}' cannot be negative (got {value})")]
    NegativeValue {
        /// Name of the negative field.
        field: String,
        /// The rejected value.
        value: Decimal,
    },
}

/// Top-level error type for ledger operations.
///
/// Validation failures are surfaced to the caller with no snapshot
/// appended; storage failures abort the reconciliation they occurred in.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input failed validation; nothing was written.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The storage backend failed; the call was aborted.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl LedgerError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if the caller can recover by correcting its input.
    ///
    /// Storage failures are never recoverable within the failed call.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if retrying the same call may succeed.
    ///
    /// The ledger performs no retries itself; this only classifies for the
    /// caller's retry policy.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) => false, // Validation errors won't change on retry
            Self::Storage(e) => matches!(e, StorageError::Connection(_)),
        }
    }
}

/// Result type alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

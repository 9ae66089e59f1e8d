//! Storage contract and backends for the result ledger.
//!
//! The trait defines the abstract interface a versioned store implements;
//! the in-memory backend is the reference implementation.

pub mod memory;
mod traits;

pub use memory::InMemoryResultStore;
pub use traits::{AppendOutcome, StorageError, VersionedStore};

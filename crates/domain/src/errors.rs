use crate::lists::ListKind;
use crate::records::TableKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A live record failed its integrity tag check. Never recoverable.
    #[error("Memory corruption detected in {table} record {id}")]
    Corruption { table: TableKind, id: usize },

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("List {list} unavailable: {reason}")]
    ListUnavailable { list: ListKind, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Snapshot rejected: {0}")]
    SnapshotRejected(String),

    #[error("Counter mismatch: {0}")]
    CounterMismatch(String),

    #[error("Invalid regex {pattern}: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl DomainError {
    /// Corruption and exhaustion are surfaced to the operator and never retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DomainError::Corruption { .. } | DomainError::ResourceExhausted(_)
        )
    }
}

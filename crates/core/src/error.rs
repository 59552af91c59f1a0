//! Error taxonomy for the engram memory engine.
//!
//! Every fallible operation returns [`EngramResult`]. The variants map to
//! distinct caller-visible failure classes:
//!
//! - `Validation`: malformed or out-of-range input (wrong embedding length,
//!   importance outside 1..=5, limit outside its range, oversized JSON).
//! - `NotFound`: missing id/key, or a project/session ownership mismatch.
//! - `Conflict`: a uniqueness violation (duplicate relation triple).
//! - `Provider`: the embedding provider failed to load, failed to embed,
//!   or produced a malformed vector.
//! - `Store`: an underlying storage failure.

use thiserror::Error;

/// Result alias used throughout the engine.
pub type EngramResult<T> = Result<T, EngramError>;

/// Engine error taxonomy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngramError {
    /// Malformed or out-of-range input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Missing id/key, or ownership mismatch on a scoped lookup/delete.
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness violation that cannot succeed as a distinct row.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Embedding provider failed or produced malformed output.
    #[error("embedding provider error: {0}")]
    Provider(String),

    /// Underlying storage failure.
    #[error("store error: {0}")]
    Store(String),
}

impl EngramError {
    /// Create a Validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        EngramError::Validation(msg.into())
    }

    /// Create a NotFound error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        EngramError::NotFound(msg.into())
    }

    /// Create a Conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        EngramError::Conflict(msg.into())
    }

    /// Create a Provider error.
    pub fn provider(msg: impl Into<String>) -> Self {
        EngramError::Provider(msg.into())
    }

    /// Create a Store error.
    pub fn store(msg: impl Into<String>) -> Self {
        EngramError::Store(msg.into())
    }

    /// True if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngramError::NotFound(_))
    }

    /// True if this is a Conflict error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, EngramError::Conflict(_))
    }

    /// True if this is a Validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, EngramError::Validation(_))
    }
}

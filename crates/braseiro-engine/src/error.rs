//! # Engine Error Types
//!
//! Error type for ledger operations. Business rule violations get their
//! own variants so the presentation tier can show a precise message
//! (which item is short, why an authorization was rejected) instead of a
//! generic failure.

use thiserror::Error;

use braseiro_core::ValidationError;
use braseiro_db::DbError;

/// Errors returned by ledger engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A sale or stock removal would drive an item's quantity negative.
    /// Nothing was committed.
    #[error("insufficient stock for '{item}': available {available}, needed {needed}")]
    InsufficientStock {
        item: String,
        available: i64,
        needed: i64,
    },

    /// Login failed: unknown name or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Dual-control check failed: the authorizer credential is wrong or
    /// does not belong to an administrator.
    #[error("authorization rejected: administrator credential required")]
    InvalidAuthorization,

    /// A register is already open; at most one session at a time.
    #[error("a cash register is already open")]
    ActiveRegisterConflict,

    /// The operation needs an open register and none exists.
    #[error("no cash register is open")]
    NoActiveRegister,

    /// A user tried to delete their own account.
    #[error("users cannot delete their own account")]
    SelfDeletion,

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input failed a business rule check.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The ledger store failed.
    #[error("database error: {0}")]
    Db(#[from] DbError),
}

impl EngineError {
    /// Creates a NotFound error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

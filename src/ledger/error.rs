//! Outcome types for ledger mutations.
//!
//! Engine operations report failure as values rather than panicking; callers
//! must check the result before assuming the ledger changed. An operation
//! that returns an error has not modified the ledger at all.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    /// The referenced account, entry, or holding does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A debit exceeds the available balance or share quantity.
    #[error("insufficient balance: requested {requested}, available {available}")]
    Insufficient { requested: f64, available: f64 },

    /// An account or exchange with this name already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

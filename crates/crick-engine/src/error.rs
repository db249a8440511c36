use crick_ledger::LedgerError;
use crick_types::TypeError;
use thiserror::Error;

/// Errors surfaced by scoring operations. None of them leave a partial
/// mutation behind.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The request breaks a scoring rule; correct it and resubmit.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Derived state would contradict the ledger. Never expected while
    /// the documented invariants hold.
    #[error("consistency violation: {0}")]
    Consistency(String),

    #[error("ledger error: {0}")]
    Ledger(LedgerError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ScoringError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_consistency(&self) -> bool {
        matches!(self, Self::Consistency(_))
    }

    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }
}

impl From<LedgerError> for ScoringError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Consistency { .. } => Self::Consistency(err.to_string()),
            LedgerError::Empty(_) => Self::NotFound(err.to_string()),
            other => Self::Ledger(other),
        }
    }
}

impl From<TypeError> for ScoringError {
    fn from(err: TypeError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type ScoringResult<T> = Result<T, ScoringError>;

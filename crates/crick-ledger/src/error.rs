use crick_types::InningsSlot;

/// Errors produced by ledger and projection operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("integrity violation in {slot} at seq {seq}: {reason}")]
    IntegrityViolation {
        slot: InningsSlot,
        seq: u64,
        reason: String,
    },

    #[error("innings {0} has no deliveries")]
    Empty(InningsSlot),

    #[error("invalid sequence range: from={from}, to={to}")]
    InvalidRange { from: u64, to: u64 },

    #[error("projection consistency violated at seq {seq}: {reason}")]
    Consistency { seq: u64, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}

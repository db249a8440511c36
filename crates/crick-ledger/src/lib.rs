//! Append-only ball ledger and innings projection for crick.
//!
//! The ledger is the sole source of truth for an innings; every statistic
//! is derived from it. This crate provides:
//! - `LedgerEntry` records with per-innings hash-linked integrity
//! - `BallLedgerWriter` / `BallLedgerReader` trait boundaries
//! - `InMemoryBallLedger` implementation for tests and embedding
//! - The innings projection: incremental `apply` and full `project`
//! - Deterministic replay of an innings from its ledger
//! - Stream validation (sequence, hash chain, delivery structure)

pub mod error;
pub mod memory;
pub mod projection;
pub mod records;
pub mod replay;
pub mod traits;
pub mod validation;

pub use error::LedgerError;
pub use memory::InMemoryBallLedger;
pub use projection::{
    BatsmanStats, BowlerStats, FallOfWicket, InningsContext, InningsStats, LastBallSummary,
    OverSummary, Partnership, ProjectionBuilder,
};
pub use records::{EntryRef, LedgerEntry};
pub use replay::{ReplayEngine, ReplayResult};
pub use traits::{BallLedgerReader, BallLedgerWriter};
pub use validation::{StreamValidator, ValidationReport, Violation, ViolationKind};

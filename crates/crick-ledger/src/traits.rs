use crick_types::{Delivery, InningsSlot};

use crate::error::LedgerError;
use crate::records::{EntryRef, LedgerEntry};

/// Write boundary for the ball ledger.
pub trait BallLedgerWriter: Send + Sync {
    /// Append a delivery. Its `sequence` must be exactly one past the
    /// current head of the innings, which rejects writers racing on an
    /// already-advanced ledger.
    fn append(&self, slot: InningsSlot, delivery: Delivery) -> Result<LedgerEntry, LedgerError>;

    /// Remove and return the highest-sequence delivery of an innings.
    fn pop_last(&self, slot: InningsSlot) -> Result<LedgerEntry, LedgerError>;
}

/// Read boundary for ledger queries and replay.
pub trait BallLedgerReader: Send + Sync {
    fn head(&self, slot: InningsSlot) -> Result<Option<EntryRef>, LedgerError>;

    fn read_all(&self, slot: InningsSlot) -> Result<Vec<LedgerEntry>, LedgerError>;

    fn read_range(
        &self,
        slot: InningsSlot,
        from_seq: u64,
        to_seq: u64,
    ) -> Result<Vec<LedgerEntry>, LedgerError>;

    fn slots(&self) -> Result<Vec<InningsSlot>, LedgerError>;

    fn delivery_count(&self, slot: InningsSlot) -> Result<u64, LedgerError>;

    /// The deliveries of an innings in ledger order.
    fn deliveries(&self, slot: InningsSlot) -> Result<Vec<Delivery>, LedgerError> {
        Ok(self
            .read_all(slot)?
            .into_iter()
            .map(|entry| entry.delivery)
            .collect())
    }
}

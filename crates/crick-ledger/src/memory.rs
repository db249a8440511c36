use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crick_types::{Delivery, InningsSlot};
use tracing::debug;

use crate::error::LedgerError;
use crate::records::{EntryRef, LedgerEntry};
use crate::traits::{BallLedgerReader, BallLedgerWriter};

/// In-memory ball ledger for one match, used by tests, the CLI, and
/// embedders that persist elsewhere.
#[derive(Default)]
pub struct InMemoryBallLedger {
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    streams: BTreeMap<InningsSlot, Vec<LedgerEntry>>,
}

impl InMemoryBallLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }

    /// Verify sequence contiguity and the hash chain of one innings.
    pub fn validate_stream(&self, slot: InningsSlot) -> Result<(), LedgerError> {
        let entries = self.read_all(slot)?;
        for (index, entry) in entries.iter().enumerate() {
            let expected_seq = (index + 1) as u64;
            if entry.seq() != expected_seq {
                return Err(LedgerError::IntegrityViolation {
                    slot,
                    seq: entry.seq(),
                    reason: format!("expected seq {expected_seq}, found {}", entry.seq()),
                });
            }

            let expected_prev = index
                .checked_sub(1)
                .map(|prev| entries[prev].entry_hash);
            if entry.prev_hash != expected_prev {
                return Err(LedgerError::IntegrityViolation {
                    slot,
                    seq: entry.seq(),
                    reason: "previous hash link mismatch".into(),
                });
            }

            if entry.recompute_hash()? != entry.entry_hash {
                return Err(LedgerError::IntegrityViolation {
                    slot,
                    seq: entry.seq(),
                    reason: "entry hash mismatch".into(),
                });
            }
        }
        Ok(())
    }
}

impl BallLedgerWriter for InMemoryBallLedger {
    fn append(&self, slot: InningsSlot, delivery: Delivery) -> Result<LedgerEntry, LedgerError> {
        let mut state = self.write_state()?;
        let stream = state.streams.entry(slot).or_default();

        let expected_seq = (stream.len() + 1) as u64;
        if delivery.sequence != expected_seq {
            return Err(LedgerError::IntegrityViolation {
                slot,
                seq: delivery.sequence,
                reason: format!("append attempted out of order; expected seq {expected_seq}"),
            });
        }

        let prev_hash = stream.last().map(|entry| entry.entry_hash);
        let entry = LedgerEntry::seal(slot, delivery, prev_hash)?;
        debug!(slot = %slot, seq = entry.seq(), hash = %entry.short_hash(), "delivery appended");
        stream.push(entry.clone());
        Ok(entry)
    }

    fn pop_last(&self, slot: InningsSlot) -> Result<LedgerEntry, LedgerError> {
        let mut state = self.write_state()?;
        let entry = state
            .streams
            .get_mut(&slot)
            .and_then(Vec::pop)
            .ok_or(LedgerError::Empty(slot))?;
        debug!(slot = %slot, seq = entry.seq(), "delivery removed");
        Ok(entry)
    }
}

impl BallLedgerReader for InMemoryBallLedger {
    fn head(&self, slot: InningsSlot) -> Result<Option<EntryRef>, LedgerError> {
        let state = self.read_state()?;
        Ok(state
            .streams
            .get(&slot)
            .and_then(|stream| stream.last())
            .map(EntryRef::from))
    }

    fn read_all(&self, slot: InningsSlot) -> Result<Vec<LedgerEntry>, LedgerError> {
        let state = self.read_state()?;
        Ok(state.streams.get(&slot).cloned().unwrap_or_default())
    }

    fn read_range(
        &self,
        slot: InningsSlot,
        from_seq: u64,
        to_seq: u64,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        if from_seq == 0 || from_seq > to_seq {
            return Err(LedgerError::InvalidRange {
                from: from_seq,
                to: to_seq,
            });
        }
        let state = self.read_state()?;
        Ok(state
            .streams
            .get(&slot)
            .map(|stream| {
                stream
                    .iter()
                    .filter(|entry| entry.seq() >= from_seq && entry.seq() <= to_seq)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn slots(&self) -> Result<Vec<InningsSlot>, LedgerError> {
        let state = self.read_state()?;
        Ok(state
            .streams
            .iter()
            .filter(|(_, stream)| !stream.is_empty())
            .map(|(slot, _)| *slot)
            .collect())
    }

    fn delivery_count(&self, slot: InningsSlot) -> Result<u64, LedgerError> {
        let state = self.read_state()?;
        Ok(state.streams.get(&slot).map_or(0, |s| s.len() as u64))
    }
}

use crick_types::{Delivery, InningsSlot};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A delivery as stored in an innings ledger, hash-linked to its
/// predecessor in the same innings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub slot: InningsSlot,
    pub delivery: Delivery,
    pub prev_hash: Option<[u8; 32]>,
    pub entry_hash: [u8; 32],
}

impl LedgerEntry {
    /// Seal a delivery onto the chain after `prev_hash`.
    pub fn seal(
        slot: InningsSlot,
        delivery: Delivery,
        prev_hash: Option<[u8; 32]>,
    ) -> Result<Self, LedgerError> {
        let entry_hash = entry_hash(&slot, &delivery, prev_hash)?;
        Ok(Self {
            slot,
            delivery,
            prev_hash,
            entry_hash,
        })
    }

    pub fn seq(&self) -> u64 {
        self.delivery.sequence
    }

    /// Recompute the hash from content, ignoring the stored value.
    pub fn recompute_hash(&self) -> Result<[u8; 32], LedgerError> {
        entry_hash(&self.slot, &self.delivery, self.prev_hash)
    }

    pub fn short_hash(&self) -> String {
        hex::encode(&self.entry_hash[..4])
    }
}

/// Lightweight pointer to a ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryRef {
    pub slot: InningsSlot,
    pub seq: u64,
    pub entry_hash: [u8; 32],
}

impl From<&LedgerEntry> for EntryRef {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            slot: entry.slot,
            seq: entry.seq(),
            entry_hash: entry.entry_hash,
        }
    }
}

#[derive(Serialize)]
struct HashedContent<'a> {
    slot: &'a InningsSlot,
    delivery: &'a Delivery,
    prev_hash: Option<[u8; 32]>,
}

fn entry_hash(
    slot: &InningsSlot,
    delivery: &Delivery,
    prev_hash: Option<[u8; 32]>,
) -> Result<[u8; 32], LedgerError> {
    let encoded = serde_json::to_vec(&HashedContent {
        slot,
        delivery,
        prev_hash,
    })
    .map_err(|e| LedgerError::Serialization(e.to_string()))?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"crick-delivery-v1:");
    hasher.update(&encoded);
    Ok(*hasher.finalize().as_bytes())
}

use crick_types::InningsSlot;

use crate::error::LedgerError;
use crate::traits::BallLedgerReader;

/// Result of stream validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub slot: InningsSlot,
    pub delivery_count: u64,
    pub hash_chain_valid: bool,
    pub sequence_contiguous: bool,
    pub deliveries_well_formed: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub seq: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    SequenceGap,
    HashChainBreak,
    HashMismatch,
    MalformedDelivery,
}

/// Innings ledger validator. Reports every violation instead of stopping
/// at the first one.
pub struct StreamValidator;

impl StreamValidator {
    pub fn validate_stream<R: BallLedgerReader>(
        reader: &R,
        slot: InningsSlot,
    ) -> Result<ValidationReport, LedgerError> {
        let entries = reader.read_all(slot)?;
        let mut violations = Vec::new();
        let mut hash_chain_valid = true;
        let mut sequence_contiguous = true;
        let mut deliveries_well_formed = true;

        for (index, entry) in entries.iter().enumerate() {
            let expected_seq = (index + 1) as u64;
            if entry.seq() != expected_seq {
                sequence_contiguous = false;
                violations.push(Violation {
                    seq: entry.seq(),
                    kind: ViolationKind::SequenceGap,
                    description: format!("expected seq {expected_seq}, got {}", entry.seq()),
                });
            }

            let expected_prev = index.checked_sub(1).map(|prev| entries[prev].entry_hash);
            if entry.prev_hash != expected_prev {
                hash_chain_valid = false;
                violations.push(Violation {
                    seq: entry.seq(),
                    kind: ViolationKind::HashChainBreak,
                    description: "previous hash link mismatch".into(),
                });
            }

            if entry.recompute_hash()? != entry.entry_hash {
                hash_chain_valid = false;
                violations.push(Violation {
                    seq: entry.seq(),
                    kind: ViolationKind::HashMismatch,
                    description: "entry hash does not match computed".into(),
                });
            }

            if let Some(reason) = entry.delivery.malformation() {
                deliveries_well_formed = false;
                violations.push(Violation {
                    seq: entry.seq(),
                    kind: ViolationKind::MalformedDelivery,
                    description: reason.into(),
                });
            }
        }

        Ok(ValidationReport {
            slot,
            delivery_count: entries.len() as u64,
            hash_chain_valid,
            sequence_contiguous,
            deliveries_well_formed,
            violations,
        })
    }

    /// Validate every innings that has at least one delivery.
    pub fn validate_all<R: BallLedgerReader>(
        reader: &R,
    ) -> Result<Vec<ValidationReport>, LedgerError> {
        reader
            .slots()?
            .into_iter()
            .map(|slot| Self::validate_stream(reader, slot))
            .collect()
    }
}

use crick_types::InningsSlot;
use tracing::debug;

use crate::error::LedgerError;
use crate::projection::{InningsContext, InningsStats, ProjectionBuilder};
use crate::traits::BallLedgerReader;

/// Result of replaying an innings ledger into a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayResult {
    pub slot: InningsSlot,
    pub evaluated_deliveries: u64,
    pub stats: InningsStats,
}

/// Deterministic replay helpers over the ball ledger.
pub struct ReplayEngine;

impl ReplayEngine {
    /// Rebuild an innings snapshot from scratch.
    pub fn replay_innings<R: BallLedgerReader>(
        reader: &R,
        context: &InningsContext,
    ) -> Result<ReplayResult, LedgerError> {
        let deliveries = reader.deliveries(context.slot)?;
        let stats = ProjectionBuilder::project(&deliveries, context)?;
        debug!(
            slot = %context.slot,
            deliveries = deliveries.len(),
            runs = stats.total_runs,
            wickets = stats.total_wickets,
            "innings replayed"
        );
        Ok(ReplayResult {
            slot: context.slot,
            evaluated_deliveries: deliveries.len() as u64,
            stats,
        })
    }

    /// Whether a cached snapshot still agrees with a full replay.
    pub fn verify_convergence<R: BallLedgerReader>(
        reader: &R,
        context: &InningsContext,
        cached: &InningsStats,
    ) -> Result<bool, LedgerError> {
        let full = Self::replay_innings(reader, context)?;
        Ok(&full.stats == cached)
    }
}

#[cfg(test)]
mod tests {
    use crick_types::{Delivery, Extras, PlayerId, PlayingXi, Side};

    use super::*;
    use crate::memory::InMemoryBallLedger;
    use crate::traits::BallLedgerWriter;

    fn context() -> InningsContext {
        let xi = PlayingXi::new((1..=11).map(|i| PlayerId::new(format!("a{i}"))).collect())
            .unwrap();
        InningsContext::new(InningsSlot::main(Side::TeamA), xi, 20)
    }

    fn ball(seq: u64, runs: u32) -> Delivery {
        Delivery {
            sequence: seq,
            striker: "a1".into(),
            non_striker: "a2".into(),
            bowler: "b1".into(),
            runs_off_bat: runs,
            extras: Extras::default(),
            boundary: false,
            free_hit: false,
            wicket: None,
        }
    }

    #[test]
    fn replay_matches_incremental_snapshot() {
        let ledger = InMemoryBallLedger::new();
        let ctx = context();
        let mut cached = ProjectionBuilder::empty(&ctx);
        for (seq, runs) in [(1, 1), (2, 0), (3, 2)] {
            let entry = ledger.append(ctx.slot, ball(seq, runs)).unwrap();
            ProjectionBuilder::apply(&mut cached, &entry.delivery, &ctx).unwrap();
        }
        let replayed = ReplayEngine::replay_innings(&ledger, &ctx).unwrap();
        assert_eq!(replayed.evaluated_deliveries, 3);
        assert_eq!(replayed.stats, cached);
        assert!(ReplayEngine::verify_convergence(&ledger, &ctx, &cached).unwrap());
    }

    #[test]
    fn drifted_cache_is_detected() {
        let ledger = InMemoryBallLedger::new();
        let ctx = context();
        let entry = ledger.append(ctx.slot, ball(1, 3)).unwrap();
        let mut cached = ProjectionBuilder::empty(&ctx);
        ProjectionBuilder::apply(&mut cached, &entry.delivery, &ctx).unwrap();
        ledger.pop_last(ctx.slot).unwrap();
        assert!(!ReplayEngine::verify_convergence(&ledger, &ctx, &cached).unwrap());
    }

    #[test]
    fn replay_empty_innings() {
        let ledger = InMemoryBallLedger::new();
        let result = ReplayEngine::replay_innings(&ledger, &context()).unwrap();
        assert_eq!(result.evaluated_deliveries, 0);
        assert!(!result.stats.has_started());
        assert_eq!(result.stats.total_runs, 0);
    }
}

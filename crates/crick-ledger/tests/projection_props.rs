use crick_ledger::{
    BallLedgerReader, BallLedgerWriter, InMemoryBallLedger, InningsContext, ProjectionBuilder,
    ReplayEngine, StreamValidator,
};
use crick_types::{
    Delivery, Extras, InningsSlot, PlayerId, PlayingXi, Side, Wicket, WicketKind, BALLS_PER_OVER,
};
use proptest::prelude::*;

fn batting_xi() -> PlayingXi {
    PlayingXi::new((1..=11).map(|i| PlayerId::new(format!("a{i}"))).collect()).unwrap()
}

fn context() -> InningsContext {
    InningsContext::new(InningsSlot::main(Side::TeamA), batting_xi(), 20)
}

/// Turns abstract (kind, runs) shapes into a well-formed innings: batters
/// come in order, strike rotates, bowlers alternate by over.
fn build_innings(shapes: &[(u8, u32)]) -> Vec<Delivery> {
    let mut deliveries = Vec::new();
    let mut striker = 1u32;
    let mut non_striker = 2u32;
    let mut next_in = 3u32;
    let mut legal = 0u32;
    let mut wickets = 0u32;

    for (kind, runs) in shapes {
        if wickets >= 10 || legal >= 120 {
            break;
        }
        let bowler = if (legal / BALLS_PER_OVER) % 2 == 0 { "b1" } else { "b2" };
        let mut d = Delivery {
            sequence: deliveries.len() as u64 + 1,
            striker: PlayerId::new(format!("a{striker}")),
            non_striker: PlayerId::new(format!("a{non_striker}")),
            bowler: bowler.into(),
            runs_off_bat: 0,
            extras: Extras::default(),
            boundary: false,
            free_hit: deliveries
                .last()
                .is_some_and(|p: &Delivery| p.is_no_ball()),
            wicket: None,
        };
        let runs = *runs;
        match kind % 8 {
            0 => {
                d.runs_off_bat = runs;
                d.boundary = runs == 4 || runs == 6;
            }
            1 => d.extras.wides = 1 + runs % 5,
            2 => {
                d.extras.no_balls = 1;
                d.runs_off_bat = runs;
                d.boundary = runs == 4 || runs == 6;
            }
            3 => d.extras.byes = runs % 5,
            4 => d.extras.leg_byes = runs % 5,
            5 => d.wicket = Some(Wicket::new(WicketKind::Bowled, d.striker.clone())),
            6 => {
                d.runs_off_bat = runs % 3;
                d.wicket = Some(Wicket::new(WicketKind::RunOut, d.non_striker.clone()));
            }
            _ => {
                d.extras.no_balls = 1;
                d.extras.byes = 1 + runs % 4;
            }
        }

        if d.is_legal() {
            legal += 1;
        }
        match &d.wicket {
            Some(w) => {
                wickets += 1;
                if wickets < 10 {
                    if w.dismissed == d.striker {
                        striker = next_in;
                    } else {
                        non_striker = next_in;
                    }
                    next_in += 1;
                }
            }
            None if d.rotates_strike() => std::mem::swap(&mut striker, &mut non_striker),
            None => {}
        }
        if d.is_legal() && legal % BALLS_PER_OVER == 0 {
            std::mem::swap(&mut striker, &mut non_striker);
        }
        deliveries.push(d);
    }
    deliveries
}

fn shapes() -> impl Strategy<Value = Vec<(u8, u32)>> {
    prop::collection::vec((0u8..8, 0u32..7), 0..160)
}

proptest! {
    #[test]
    fn full_replay_equals_incremental_fold_for_every_prefix(shapes in shapes()) {
        let deliveries = build_innings(&shapes);
        let ctx = context().with_target(Some(180));
        let mut incremental = ProjectionBuilder::empty(&ctx);
        for (i, delivery) in deliveries.iter().enumerate() {
            ProjectionBuilder::apply(&mut incremental, delivery, &ctx).unwrap();
            let replayed = ProjectionBuilder::project(&deliveries[..=i], &ctx).unwrap();
            prop_assert_eq!(&replayed, &incremental);
        }
    }

    #[test]
    fn runs_are_conserved(shapes in shapes()) {
        let deliveries = build_innings(&shapes);
        let ctx = context();
        let mut stats = ProjectionBuilder::empty(&ctx);
        let mut bat = 0u32;
        let mut extras = 0u32;
        for delivery in &deliveries {
            ProjectionBuilder::apply(&mut stats, delivery, &ctx).unwrap();
            bat += delivery.runs_off_bat;
            extras += delivery.extras.total();
            prop_assert_eq!(stats.total_runs, bat + extras);
            prop_assert_eq!(stats.extras.total(), extras);
            let batting: u32 = stats.batsman_stats.iter().map(|b| b.runs).sum();
            prop_assert_eq!(batting, bat);
            let conceded: u32 = stats.bowler_stats.iter().map(|b| b.runs_conceded).sum();
            prop_assert_eq!(conceded + stats.extras.byes + stats.extras.leg_byes + stats.extras.penalty, stats.total_runs);
        }
    }

    #[test]
    fn wickets_never_exceed_bound(shapes in shapes()) {
        let deliveries = build_innings(&shapes);
        let ctx = context();
        let stats = ProjectionBuilder::project(&deliveries, &ctx).unwrap();
        prop_assert!(stats.total_wickets <= ctx.max_wickets);
        prop_assert_eq!(stats.fall_of_wickets.len() as u32, stats.total_wickets);
        let legal = deliveries.iter().filter(|d| d.is_legal()).count() as u32;
        prop_assert_eq!(stats.legal_balls, legal);
        for batter in &stats.batsman_stats {
            prop_assert!(ctx.batting_xi.contains(&batter.player));
        }
    }

    #[test]
    fn ledger_replay_converges_after_pops(shapes in shapes(), pops in 0usize..10) {
        let deliveries = build_innings(&shapes);
        let ctx = context();
        let ledger = InMemoryBallLedger::new();
        for delivery in &deliveries {
            ledger.append(ctx.slot, delivery.clone()).unwrap();
        }
        let remaining = deliveries.len().saturating_sub(pops);
        for _ in remaining..deliveries.len() {
            ledger.pop_last(ctx.slot).unwrap();
        }
        let expected = ProjectionBuilder::project(&deliveries[..remaining], &ctx).unwrap();
        prop_assert!(ReplayEngine::verify_convergence(&ledger, &ctx, &expected).unwrap());
        prop_assert_eq!(ledger.delivery_count(ctx.slot).unwrap(), remaining as u64);
        prop_assert!(StreamValidator::validate_stream(&ledger, ctx.slot).unwrap().is_valid());
    }
}

#[test]
fn all_out_innings_refuses_further_deliveries() {
    let shapes: Vec<(u8, u32)> = std::iter::repeat((5u8, 0u32)).take(12).collect();
    let deliveries = build_innings(&shapes);
    assert_eq!(deliveries.len(), 10);
    let ctx = context();
    let mut stats = ProjectionBuilder::project(&deliveries, &ctx).unwrap();
    assert!(stats.is_all_out());

    let mut extra = deliveries[9].clone();
    extra.sequence = 11;
    extra.wicket = None;
    assert!(ProjectionBuilder::apply(&mut stats, &extra, &ctx).is_err());
    assert_eq!(stats.total_wickets, 10);
}

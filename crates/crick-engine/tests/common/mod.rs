#![allow(dead_code)]

use std::collections::HashMap;

use crick_engine::{
    Hooks, MatchConfig, MatchPhase, MatchScorer, RoleField, ScoringInput, ScoringResult,
    SubmitOutcome, TeamConfig,
};
use crick_ledger::InMemoryBallLedger;
use crick_types::{InningsSlot, MatchId, PlayerId, PlayingXi, Side};

pub fn xi(prefix: &str) -> PlayingXi {
    PlayingXi::new((1..=11).map(|i| PlayerId::new(format!("{prefix}{i}"))).collect()).unwrap()
}

pub fn config(overs_limit: u32) -> MatchConfig {
    MatchConfig::new(
        TeamConfig {
            name: "Lions".into(),
            playing_xi: xi("a"),
        },
        TeamConfig {
            name: "Tigers".into(),
            playing_xi: xi("b"),
        },
        overs_limit,
    )
}

pub fn prefix(side: Side) -> &'static str {
    match side {
        Side::TeamA => "a",
        Side::TeamB => "b",
    }
}

/// Drives a scorer the way an operator would: fills vacant crease roles
/// with the next batter in order and rotates two bowlers per side.
pub struct Driver {
    pub scorer: MatchScorer<InMemoryBallLedger>,
    next_batter: HashMap<InningsSlot, u32>,
}

impl Driver {
    pub fn new(overs_limit: u32) -> Self {
        Self::with_config(config(overs_limit), Hooks::default())
    }

    pub fn with_config(config: MatchConfig, hooks: Hooks) -> Self {
        let scorer =
            MatchScorer::new(MatchId::new(), config, InMemoryBallLedger::new(), hooks).unwrap();
        Self {
            scorer,
            next_batter: HashMap::new(),
        }
    }

    pub fn slot(&self) -> InningsSlot {
        self.scorer.state().current
    }

    /// Assign whatever roles are vacant.
    pub fn fill_roles(&mut self) {
        let slot = self.slot();
        let batting = prefix(slot.side);
        let bowling = prefix(slot.side.other());
        for field in [RoleField::Striker, RoleField::NonStriker] {
            if self.scorer.state().role(field).is_none() {
                let next = self.next_batter.entry(slot).or_insert(1);
                let player = PlayerId::new(format!("{batting}{next}"));
                *next += 1;
                self.scorer.assign_role(field, player).unwrap();
            }
        }
        if self.scorer.state().bowler.is_none() {
            let last = self.scorer.state().last_over_bowler.clone();
            let first = PlayerId::new(format!("{bowling}1"));
            let bowler = if last.as_ref() == Some(&first) {
                PlayerId::new(format!("{bowling}2"))
            } else {
                first
            };
            self.scorer.assign_role(RoleField::Bowler, bowler).unwrap();
        }
    }

    pub fn try_bowl(&mut self, input: ScoringInput) -> ScoringResult<SubmitOutcome> {
        self.fill_roles();
        let slot = self.slot();
        self.scorer.submit(slot, &input)
    }

    pub fn bowl(&mut self, input: ScoringInput) -> SubmitOutcome {
        self.try_bowl(input).unwrap()
    }

    pub fn bowl_many(&mut self, count: usize, input: ScoringInput) {
        for _ in 0..count {
            self.bowl(input.clone());
        }
    }

    /// Dots until the current innings closes.
    pub fn play_out(&mut self) {
        while self.scorer.state().phase.is_scoring() {
            self.bowl(ScoringInput::dot());
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.scorer.state().phase
    }
}

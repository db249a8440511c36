use std::collections::BTreeMap;
use std::fmt;

use crick_ledger::InningsStats;
use crick_types::{InningsSlot, Side, Stage};
use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::state::MatchState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Margin {
    Runs(u32),
    Wickets(u32),
}

impl fmt::Display for Margin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (count, unit) = match self {
            Self::Runs(n) => (*n, "run"),
            Self::Wickets(n) => (*n, "wicket"),
        };
        let plural = if count == 1 { "" } else { "s" };
        write!(f, "{count} {unit}{plural}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Not decided yet.
    Pending,
    Won {
        winner: Side,
        margin: Margin,
        /// Super over round that decided the match, if any.
        super_over: Option<u32>,
    },
    Tied,
    NoResult,
}

/// Structured result plus the canonical one-line summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub outcome: Outcome,
    pub summary: String,
}

impl MatchResult {
    pub fn pending() -> Self {
        Self {
            outcome: Outcome::Pending,
            summary: String::new(),
        }
    }

    pub fn is_decided(&self) -> bool {
        self.outcome != Outcome::Pending
    }

    pub fn winner(&self) -> Option<Side> {
        match self.outcome {
            Outcome::Won { winner, .. } => Some(winner),
            _ => None,
        }
    }
}

/// Pure resolution of a match result from innings snapshots.
pub struct ResultResolver;

impl ResultResolver {
    pub fn resolve(
        innings: &BTreeMap<InningsSlot, InningsStats>,
        state: &MatchState,
        config: &MatchConfig,
    ) -> MatchResult {
        if state.abandoned {
            return MatchResult {
                outcome: Outcome::NoResult,
                summary: "No Result".into(),
            };
        }
        let outcome = Self::resolve_stage(innings, state, Stage::Main);
        let summary = match &outcome {
            Outcome::Pending => String::new(),
            Outcome::Won {
                winner,
                margin,
                super_over: None,
            } => format!("{} won by {margin}", config.team_name(*winner)),
            Outcome::Won {
                winner,
                margin,
                super_over: Some(1),
            } => format!("{} won the Super Over by {margin}", config.team_name(*winner)),
            Outcome::Won {
                winner,
                margin,
                super_over: Some(round),
            } => format!(
                "{} won Super Over {round} by {margin}",
                config.team_name(*winner)
            ),
            Outcome::Tied => "Match Tied".into(),
            Outcome::NoResult => "No Result".into(),
        };
        MatchResult { outcome, summary }
    }

    /// Compare the two innings of `stage`, descending into the next super
    /// over when they finish level.
    fn resolve_stage(
        innings: &BTreeMap<InningsSlot, InningsStats>,
        state: &MatchState,
        stage: Stage,
    ) -> Outcome {
        let first_side = state.first_side(stage);
        let started = |side: Side| {
            innings
                .get(&InningsSlot { side, stage })
                .filter(|stats| stats.has_started())
        };
        let (Some(first), Some(second)) = (started(first_side), started(first_side.other()))
        else {
            return Outcome::Pending;
        };
        let super_over = match stage {
            Stage::Main => None,
            Stage::SuperOver(round) => Some(round),
        };

        if second.total_runs > first.total_runs {
            return Outcome::Won {
                winner: first_side.other(),
                margin: Margin::Wickets(second.wickets_in_hand()),
                super_over,
            };
        }
        let chase_over = second.is_all_out() || second.overs_exhausted();
        if !chase_over {
            return Outcome::Pending;
        }
        if first.total_runs > second.total_runs {
            return Outcome::Won {
                winner: first_side,
                margin: Margin::Runs(first.total_runs - second.total_runs),
                super_over,
            };
        }
        match Self::resolve_stage(innings, state, stage.next_super_over()) {
            Outcome::Pending => Outcome::Tied,
            decided => decided,
        }
    }
}

//! The match state machine.
//!
//! [`MatchState`] is a value object. Every change goes through
//! [`MatchState::apply`], a pure `(State, Event) -> State` transition that
//! either returns the next state or rejects the event without touching
//! the current one. The scorer owns persistence and side effects.

use std::fmt;

use crick_types::{Delivery, InningsSlot, PlayerId, Side, Stage};
use serde::{Deserialize, Serialize};

use crate::error::{ScoringError, ScoringResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPhase {
    FirstInnings,
    InningsBreak,
    SecondInnings,
    /// Scores level after a completed chase; a super over may follow.
    Tied,
    Finished,
}

impl MatchPhase {
    /// Phases in which deliveries and role changes are accepted.
    pub fn is_scoring(self) -> bool {
        matches!(self, Self::FirstInnings | Self::SecondInnings)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FirstInnings => "first innings",
            Self::InningsBreak => "innings break",
            Self::SecondInnings => "second innings",
            Self::Tied => "tied",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Role an operator can assign at the crease or at the bowling end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleField {
    Striker,
    NonStriker,
    Bowler,
}

impl fmt::Display for RoleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Striker => "striker",
            Self::NonStriker => "non-striker",
            Self::Bowler => "bowler",
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub runs: u32,
    pub wickets: u32,
    pub legal_balls: u32,
}

/// Main-match totals, frozen when the first super over starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainMatchScore {
    pub team_a: ScoreLine,
    pub team_b: ScoreLine,
}

/// Events accepted by the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchEvent {
    RoleAssigned {
        field: RoleField,
        player: PlayerId,
    },
    DeliveryRecorded {
        slot: InningsSlot,
        delivery: Delivery,
        over_complete: bool,
        /// Final runs of the innings when this ball closed it.
        innings_closed: Option<u32>,
    },
    SecondInningsStarted,
    SuperOverStarted {
        main_score: MainMatchScore,
    },
    /// The last delivery of `slot` was removed from the ledger.
    DeliveryUndone {
        slot: InningsSlot,
        removed: Delivery,
        /// Bowler of the last remaining ball, when that ball completed an over.
        last_over_bowler: Option<PlayerId>,
        target: Option<u32>,
    },
    Finalized {
        player_of_match: PlayerId,
    },
    Abandoned,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    /// Side that batted first in the main match.
    pub batting_first: Side,
    /// The innings currently (or most recently) being scored.
    pub current: InningsSlot,
    pub phase: MatchPhase,
    pub striker: Option<PlayerId>,
    pub non_striker: Option<PlayerId>,
    pub bowler: Option<PlayerId>,
    /// Set right after an over completes; that bowler may not start the next.
    pub last_over_bowler: Option<PlayerId>,
    pub free_hit: bool,
    pub target: Option<u32>,
    pub super_over_count: u32,
    pub main_match_score: Option<MainMatchScore>,
    pub player_of_match: Option<PlayerId>,
    pub abandoned: bool,
}

impl MatchState {
    pub fn new(batting_first: Side) -> Self {
        Self {
            batting_first,
            current: InningsSlot::main(batting_first),
            phase: MatchPhase::FirstInnings,
            striker: None,
            non_striker: None,
            bowler: None,
            last_over_bowler: None,
            free_hit: false,
            target: None,
            super_over_count: 0,
            main_match_score: None,
            player_of_match: None,
            abandoned: false,
        }
    }

    pub fn is_super_over(&self) -> bool {
        self.current.is_super_over()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == MatchPhase::Finished
    }

    /// Side batting first in `stage`. The side that batted second in a
    /// tied contest opens the super over that follows it.
    pub fn first_side(&self, stage: Stage) -> Side {
        match stage {
            Stage::Main => self.batting_first,
            Stage::SuperOver(round) if round % 2 == 1 => self.batting_first.other(),
            Stage::SuperOver(_) => self.batting_first,
        }
    }

    /// Whether `slot` is the chasing innings of its stage.
    pub fn is_chasing(&self, slot: InningsSlot) -> bool {
        slot.side != self.first_side(slot.stage)
    }

    /// Every innings slot reachable so far, in playing order.
    pub fn play_order(&self) -> Vec<InningsSlot> {
        let stages = std::iter::once(Stage::Main)
            .chain((1..=self.super_over_count).map(Stage::SuperOver));
        stages
            .flat_map(|stage| {
                let first = self.first_side(stage);
                [
                    InningsSlot { side: first, stage },
                    InningsSlot {
                        side: first.other(),
                        stage,
                    },
                ]
            })
            .collect()
    }

    /// The three roles needed to bowl the next ball.
    pub fn crease(&self) -> ScoringResult<(&PlayerId, &PlayerId, &PlayerId)> {
        let missing = |field: RoleField| {
            ScoringError::validation(format!("{field} must be assigned before scoring"))
        };
        let striker = self.striker.as_ref().ok_or_else(|| missing(RoleField::Striker))?;
        let non_striker = self
            .non_striker
            .as_ref()
            .ok_or_else(|| missing(RoleField::NonStriker))?;
        let bowler = self.bowler.as_ref().ok_or_else(|| missing(RoleField::Bowler))?;
        Ok((striker, non_striker, bowler))
    }

    pub fn role(&self, field: RoleField) -> Option<&PlayerId> {
        match field {
            RoleField::Striker => self.striker.as_ref(),
            RoleField::NonStriker => self.non_striker.as_ref(),
            RoleField::Bowler => self.bowler.as_ref(),
        }
    }

    /// Compute the state after `event`. `self` is never modified.
    pub fn apply(&self, event: &MatchEvent) -> ScoringResult<MatchState> {
        let mut next = self.clone();
        match event {
            MatchEvent::RoleAssigned { field, player } => {
                self.require_scoring()?;
                next.assign(*field, player)?;
            }
            MatchEvent::DeliveryRecorded {
                slot,
                delivery,
                over_complete,
                innings_closed,
            } => {
                self.require_scoring()?;
                if *slot != self.current {
                    return Err(ScoringError::validation(format!(
                        "{slot} is not the active innings ({})",
                        self.current
                    )));
                }
                next.advance_crease(delivery, *over_complete);
                if let Some(runs) = innings_closed {
                    next.close_innings(*runs);
                }
            }
            MatchEvent::SecondInningsStarted => {
                if self.phase != MatchPhase::InningsBreak {
                    return Err(ScoringError::validation(format!(
                        "the second innings can only start from the innings break, not {}",
                        self.phase
                    )));
                }
                next.current = self.current.opponent();
                next.phase = MatchPhase::SecondInnings;
                next.clear_crease();
            }
            MatchEvent::SuperOverStarted { main_score } => {
                if self.phase != MatchPhase::Tied {
                    return Err(ScoringError::validation(format!(
                        "a super over needs a tied match, not {}",
                        self.phase
                    )));
                }
                next.super_over_count += 1;
                let stage = Stage::SuperOver(next.super_over_count);
                next.current = InningsSlot {
                    side: next.first_side(stage),
                    stage,
                };
                next.phase = MatchPhase::FirstInnings;
                next.target = None;
                next.main_match_score.get_or_insert(*main_score);
                next.clear_crease();
            }
            MatchEvent::DeliveryUndone {
                slot,
                removed,
                last_over_bowler,
                target,
            } => {
                if self.abandoned {
                    return Err(ScoringError::validation(
                        "an abandoned match cannot be reopened",
                    ));
                }
                next.current = *slot;
                next.phase = if self.is_chasing(*slot) {
                    MatchPhase::SecondInnings
                } else {
                    MatchPhase::FirstInnings
                };
                next.striker = Some(removed.striker.clone());
                next.non_striker = Some(removed.non_striker.clone());
                next.bowler = Some(removed.bowler.clone());
                next.last_over_bowler = last_over_bowler.clone();
                next.free_hit = removed.free_hit;
                next.target = *target;
                next.super_over_count = match slot.stage {
                    Stage::Main => 0,
                    Stage::SuperOver(round) => round,
                };
                if next.super_over_count == 0 {
                    next.main_match_score = None;
                }
                next.player_of_match = None;
            }
            MatchEvent::Finalized { player_of_match } => {
                if !matches!(self.phase, MatchPhase::Tied | MatchPhase::Finished) || self.abandoned
                {
                    return Err(ScoringError::validation(format!(
                        "only a completed match can be finalized, not one in the {}",
                        self.phase
                    )));
                }
                next.phase = MatchPhase::Finished;
                next.player_of_match = Some(player_of_match.clone());
            }
            MatchEvent::Abandoned => {
                if self.is_finished() {
                    return Err(ScoringError::validation(
                        "a finished match cannot be abandoned",
                    ));
                }
                next.phase = MatchPhase::Finished;
                next.abandoned = true;
                next.clear_crease();
            }
        }
        Ok(next)
    }

    fn require_scoring(&self) -> ScoringResult<()> {
        if self.phase.is_scoring() {
            Ok(())
        } else {
            Err(ScoringError::validation(format!(
                "the match is not accepting scoring during the {}",
                self.phase
            )))
        }
    }

    fn assign(&mut self, field: RoleField, player: &PlayerId) -> ScoringResult<()> {
        match field {
            RoleField::Striker | RoleField::NonStriker => {
                let partner = match field {
                    RoleField::Striker => &self.non_striker,
                    _ => &self.striker,
                };
                if partner.as_ref() == Some(player) {
                    return Err(ScoringError::validation(format!(
                        "{player} is already at the other end"
                    )));
                }
            }
            RoleField::Bowler => {
                if self.last_over_bowler.as_ref() == Some(player) {
                    return Err(ScoringError::validation(format!(
                        "{player} bowled the previous over and cannot bowl consecutive overs"
                    )));
                }
            }
        }
        let slot = match field {
            RoleField::Striker => &mut self.striker,
            RoleField::NonStriker => &mut self.non_striker,
            RoleField::Bowler => &mut self.bowler,
        };
        *slot = Some(player.clone());
        Ok(())
    }

    /// Roles after a ball: the dismissed batter's end falls vacant, odd
    /// running runs swap ends, and a completed over swaps again.
    fn advance_crease(&mut self, delivery: &Delivery, over_complete: bool) {
        let mut striker = Some(delivery.striker.clone());
        let mut non_striker = Some(delivery.non_striker.clone());
        match &delivery.wicket {
            Some(w) if w.dismissed == delivery.striker => striker = None,
            Some(_) => non_striker = None,
            None if delivery.rotates_strike() => std::mem::swap(&mut striker, &mut non_striker),
            None => {}
        }
        if over_complete {
            std::mem::swap(&mut striker, &mut non_striker);
            self.last_over_bowler = Some(delivery.bowler.clone());
            self.bowler = None;
        } else {
            self.last_over_bowler = None;
            self.bowler = Some(delivery.bowler.clone());
        }
        self.striker = striker;
        self.non_striker = non_striker;
        self.free_hit = delivery.is_no_ball();
    }

    fn close_innings(&mut self, runs: u32) {
        if self.is_chasing(self.current) {
            let target = self.target.unwrap_or(0);
            self.phase = if runs + 1 == target {
                MatchPhase::Tied
            } else {
                MatchPhase::Finished
            };
        } else {
            self.phase = MatchPhase::InningsBreak;
            self.target = Some(runs + 1);
        }
        self.clear_crease();
    }

    fn clear_crease(&mut self) {
        self.striker = None;
        self.non_striker = None;
        self.bowler = None;
        self.last_over_bowler = None;
        self.free_hit = false;
    }
}

#[cfg(test)]
mod tests {
    use crick_types::{Extras, Wicket, WicketKind};

    use super::*;

    fn ball(striker: &str, non_striker: &str, runs: u32) -> Delivery {
        Delivery {
            sequence: 1,
            striker: striker.into(),
            non_striker: non_striker.into(),
            bowler: "b1".into(),
            runs_off_bat: runs,
            extras: Extras::default(),
            boundary: runs == 4 || runs == 6,
            free_hit: false,
            wicket: None,
        }
    }

    fn ready() -> MatchState {
        let mut state = MatchState::new(Side::TeamA);
        for (field, player) in [
            (RoleField::Striker, "a1"),
            (RoleField::NonStriker, "a2"),
            (RoleField::Bowler, "b1"),
        ] {
            state = state
                .apply(&MatchEvent::RoleAssigned {
                    field,
                    player: player.into(),
                })
                .unwrap();
        }
        state
    }

    fn record(state: &MatchState, delivery: Delivery, over_complete: bool) -> MatchState {
        state
            .apply(&MatchEvent::DeliveryRecorded {
                slot: state.current,
                delivery,
                over_complete,
                innings_closed: None,
            })
            .unwrap()
    }

    #[test]
    fn strike_rotation_composes_with_over_end() {
        let state = ready();
        let one = record(&state, ball("a1", "a2", 1), false);
        assert_eq!(one.striker, Some("a2".into()));
        let four = record(&state, ball("a1", "a2", 4), false);
        assert_eq!(four.striker, Some("a1".into()));
        let over_end = record(&state, ball("a1", "a2", 0), true);
        assert_eq!(over_end.striker, Some("a2".into()));
        let both = record(&state, ball("a1", "a2", 1), true);
        assert_eq!(both.striker, Some("a1".into()));
        assert_eq!(both.last_over_bowler, Some("b1".into()));
        assert_eq!(both.bowler, None);
    }

    #[test]
    fn wicket_vacates_the_dismissed_end() {
        let mut out = ball("a1", "a2", 0);
        out.wicket = Some(Wicket::new(WicketKind::Bowled, "a1".into()));
        let state = record(&ready(), out, false);
        assert_eq!(state.striker, None);
        assert_eq!(state.non_striker, Some("a2".into()));
        assert!(state.crease().unwrap_err().is_validation());
    }

    #[test]
    fn previous_over_bowler_is_rejected() {
        let state = record(&ready(), ball("a1", "a2", 0), true);
        let err = state
            .apply(&MatchEvent::RoleAssigned {
                field: RoleField::Bowler,
                player: "b1".into(),
            })
            .unwrap_err();
        assert!(err.is_validation());
        assert!(state
            .apply(&MatchEvent::RoleAssigned {
                field: RoleField::Bowler,
                player: "b2".into(),
            })
            .is_ok());
    }

    #[test]
    fn striker_cannot_equal_non_striker() {
        let err = ready()
            .apply(&MatchEvent::RoleAssigned {
                field: RoleField::Striker,
                player: "a2".into(),
            })
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn no_ball_sets_free_hit_for_one_delivery() {
        let mut nb = ball("a1", "a2", 0);
        nb.extras.no_balls = 1;
        let state = record(&ready(), nb, false);
        assert!(state.free_hit);
        let state = record(&state, ball("a1", "a2", 0), false);
        assert!(!state.free_hit);
    }

    #[test]
    fn innings_transitions_follow_the_chase() {
        let state = ready()
            .apply(&MatchEvent::DeliveryRecorded {
                slot: InningsSlot::main(Side::TeamA),
                delivery: ball("a1", "a2", 6),
                over_complete: false,
                innings_closed: Some(120),
            })
            .unwrap();
        assert_eq!(state.phase, MatchPhase::InningsBreak);
        assert_eq!(state.target, Some(121));
        assert!(state.crease().is_err());

        let chase = state.apply(&MatchEvent::SecondInningsStarted).unwrap();
        assert_eq!(chase.current, InningsSlot::main(Side::TeamB));
        assert!(chase.is_chasing(chase.current));

        let close = |runs| {
            chase
                .apply(&MatchEvent::DeliveryRecorded {
                    slot: chase.current,
                    delivery: ball("b5", "b6", 0),
                    over_complete: false,
                    innings_closed: Some(runs),
                })
                .unwrap()
                .phase
        };
        assert_eq!(close(121), MatchPhase::Finished);
        assert_eq!(close(120), MatchPhase::Tied);
        assert_eq!(close(90), MatchPhase::Finished);
    }

    #[test]
    fn super_over_order_alternates() {
        let mut state = MatchState::new(Side::TeamA);
        state.phase = MatchPhase::Tied;
        let score = MainMatchScore {
            team_a: ScoreLine::default(),
            team_b: ScoreLine::default(),
        };
        let first = state
            .apply(&MatchEvent::SuperOverStarted { main_score: score })
            .unwrap();
        assert_eq!(first.current, InningsSlot::super_over(Side::TeamB, 1));
        assert_eq!(first.main_match_score, Some(score));

        let mut tied_again = first.clone();
        tied_again.phase = MatchPhase::Tied;
        let second = tied_again
            .apply(&MatchEvent::SuperOverStarted { main_score: score })
            .unwrap();
        assert_eq!(second.current, InningsSlot::super_over(Side::TeamA, 2));
        assert_eq!(
            second.play_order(),
            vec![
                InningsSlot::main(Side::TeamA),
                InningsSlot::main(Side::TeamB),
                InningsSlot::super_over(Side::TeamB, 1),
                InningsSlot::super_over(Side::TeamA, 1),
                InningsSlot::super_over(Side::TeamA, 2),
                InningsSlot::super_over(Side::TeamB, 2),
            ]
        );
    }

    #[test]
    fn finished_match_rejects_scoring_and_super_over() {
        let mut state = ready();
        state.phase = MatchPhase::Finished;
        assert!(state
            .apply(&MatchEvent::DeliveryRecorded {
                slot: state.current,
                delivery: ball("a1", "a2", 0),
                over_complete: false,
                innings_closed: None,
            })
            .unwrap_err()
            .is_validation());
        let score = MainMatchScore {
            team_a: ScoreLine::default(),
            team_b: ScoreLine::default(),
        };
        assert!(state
            .apply(&MatchEvent::SuperOverStarted { main_score: score })
            .is_err());
        assert!(state.apply(&MatchEvent::Abandoned).is_err());
    }

    #[test]
    fn undo_reopens_and_restores_roles() {
        let mut state = ready();
        state.phase = MatchPhase::Finished;
        state.current = InningsSlot::main(Side::TeamB);
        state.player_of_match = Some("a1".into());
        let removed = ball("b3", "b4", 2);
        let reopened = state
            .apply(&MatchEvent::DeliveryUndone {
                slot: InningsSlot::main(Side::TeamB),
                removed: removed.clone(),
                last_over_bowler: None,
                target: Some(140),
            })
            .unwrap();
        assert_eq!(reopened.phase, MatchPhase::SecondInnings);
        assert_eq!(reopened.striker, Some("b3".into()));
        assert_eq!(reopened.bowler, Some("b1".into()));
        assert_eq!(reopened.target, Some(140));
        assert_eq!(reopened.player_of_match, None);
    }
}

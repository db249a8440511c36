//! Per-match scoring shell: the Delivery Processor and the Undo/Replay
//! Coordinator around the pure projection and state machine.
//!
//! Every mutation is computed in full before anything is written. Only
//! when the next snapshot and the next state are known to be valid does
//! the delivery reach the ledger, so a rejected call leaves no trace.

use std::collections::BTreeMap;

use crick_ledger::{
    BallLedgerReader, BallLedgerWriter, EntryRef, InningsContext, InningsStats, ProjectionBuilder,
    ReplayEngine,
};
use crick_types::{InningsSlot, MatchId, PlayerId, Side, Stage, BALLS_PER_OVER};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::MatchConfig;
use crate::error::{ScoringError, ScoringResult};
use crate::hooks::{CareerRecord, Hooks, NoticeKind, Notification};
use crate::input::ScoringInput;
use crate::result::{MatchResult, ResultResolver};
use crate::state::{MainMatchScore, MatchEvent, MatchPhase, MatchState, RoleField, ScoreLine};

const MILESTONES: [u32; 2] = [50, 100];

/// Everything an observer needs to render the match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub match_id: MatchId,
    pub state: MatchState,
    /// Innings in playing order.
    pub innings: Vec<InningsStats>,
    pub result: MatchResult,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubmitOutcome {
    pub entry: EntryRef,
    pub innings: InningsStats,
    pub over_complete: bool,
    pub innings_complete: bool,
    pub state: MatchState,
}

pub struct MatchScorer<L> {
    match_id: MatchId,
    config: MatchConfig,
    ledger: L,
    state: MatchState,
    innings: BTreeMap<InningsSlot, InningsStats>,
    hooks: Hooks,
    career_synced: bool,
    snapshots: watch::Sender<MatchSnapshot>,
}

impl<L: BallLedgerReader + BallLedgerWriter> MatchScorer<L> {
    /// Start a match on an empty ledger.
    pub fn new(match_id: MatchId, config: MatchConfig, ledger: L, hooks: Hooks) -> ScoringResult<Self> {
        config.validate()?;
        if !ledger.slots()?.is_empty() {
            return Err(ScoringError::validation(
                "a new match needs an empty ball ledger",
            ));
        }
        let state = MatchState::new(config.batting_first);
        let (snapshots, _) = watch::channel(MatchSnapshot {
            match_id,
            state: state.clone(),
            innings: Vec::new(),
            result: MatchResult::pending(),
        });
        let mut scorer = Self {
            match_id,
            config,
            ledger,
            state,
            innings: BTreeMap::new(),
            hooks,
            career_synced: false,
            snapshots,
        };
        let opening = scorer.state.current;
        let context = scorer.context(opening);
        scorer
            .innings
            .insert(opening, ProjectionBuilder::empty(&context));
        scorer.publish();
        info!(match_id = %match_id, slot = %opening, "match created");
        Ok(scorer)
    }

    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn innings(&self, slot: InningsSlot) -> Option<&InningsStats> {
        self.innings.get(&slot)
    }

    pub fn current_innings(&self) -> Option<&InningsStats> {
        self.innings.get(&self.state.current)
    }

    /// Innings snapshots in playing order.
    pub fn all_innings(&self) -> Vec<InningsStats> {
        self.state
            .play_order()
            .into_iter()
            .filter_map(|slot| self.innings.get(&slot).cloned())
            .collect()
    }

    pub fn result(&self) -> MatchResult {
        ResultResolver::resolve(&self.innings, &self.state, &self.config)
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            match_id: self.match_id,
            state: self.state.clone(),
            innings: self.all_innings(),
            result: self.result(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<MatchSnapshot> {
        self.snapshots.subscribe()
    }

    /// Projection inputs for `slot`; a chasing innings targets one more
    /// than the innings it follows.
    fn context(&self, slot: InningsSlot) -> InningsContext {
        let xi = self.config.team(slot.side).playing_xi.clone();
        let context = match slot.stage {
            Stage::Main => InningsContext::new(slot, xi, self.config.overs_limit),
            Stage::SuperOver(_) => InningsContext::new(slot, xi, self.config.super_over.overs)
                .with_wicket_cap(self.config.super_over.max_wickets),
        };
        let target = self
            .state
            .is_chasing(slot)
            .then(|| self.innings.get(&slot.opponent()).map(|s| s.total_runs + 1))
            .flatten();
        context.with_target(target)
    }

    /// Validate, normalize and record one delivery.
    pub fn submit(&mut self, slot: InningsSlot, input: &ScoringInput) -> ScoringResult<SubmitOutcome> {
        match self.try_submit(slot, input) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(match_id = %self.match_id, slot = %slot, error = %err, "delivery rejected");
                Err(err)
            }
        }
    }

    fn try_submit(&mut self, slot: InningsSlot, input: &ScoringInput) -> ScoringResult<SubmitOutcome> {
        if !self.state.phase.is_scoring() {
            return Err(ScoringError::validation(format!(
                "the match is not accepting deliveries during the {}",
                self.state.phase
            )));
        }
        if slot != self.state.current {
            return Err(ScoringError::validation(format!(
                "{slot} is not the active innings ({})",
                self.state.current
            )));
        }
        let (striker, non_striker, bowler) = self.state.crease()?;
        if striker == non_striker {
            return Err(ScoringError::Consistency(format!(
                "{striker} holds both ends of the crease"
            )));
        }
        if self.state.last_over_bowler.as_ref() == Some(bowler) {
            return Err(ScoringError::validation(format!(
                "{bowler} bowled the previous over; select a new bowler"
            )));
        }
        let current = self
            .innings
            .get(&slot)
            .ok_or_else(|| ScoringError::NotFound(format!("innings {slot}")))?;
        if current.is_all_out() || current.overs_exhausted() || current.target_reached() {
            return Err(ScoringError::validation(format!("innings {slot} is complete")));
        }

        let delivery = input.normalize(
            current.last_sequence + 1,
            striker,
            non_striker,
            bowler,
            self.state.free_hit,
        )?;
        let context = self.context(slot);
        let mut next = current.clone();
        ProjectionBuilder::apply(&mut next, &delivery, &context)?;

        let over_complete = delivery.is_legal() && next.legal_balls % BALLS_PER_OVER == 0;
        let innings_complete = next.is_all_out() || next.overs_exhausted() || next.target_reached();
        let next_state = self.state.apply(&MatchEvent::DeliveryRecorded {
            slot,
            delivery: delivery.clone(),
            over_complete,
            innings_closed: innings_complete.then_some(next.total_runs),
        })?;

        let entry = self.ledger.append(slot, delivery.clone())?;
        let previous = self.innings.insert(slot, next.clone());
        let previous_phase = self.state.phase;
        self.state = next_state;
        debug!(
            match_id = %self.match_id,
            slot = %slot,
            seq = entry.seq(),
            badge = %delivery.badge(),
            score = %format!("{}/{}", next.total_runs, next.total_wickets),
            overs = %next.overs(),
            "delivery recorded"
        );

        if let Some(wicket) = &delivery.wicket {
            self.notify(
                NoticeKind::Wicket,
                format!("Wicket! {} out", wicket.dismissed),
                format!(
                    "{} {} ({}/{} in {} overs)",
                    wicket.dismissed,
                    wicket.dismissal_text(&delivery.bowler),
                    next.total_runs,
                    next.total_wickets,
                    next.overs()
                ),
            );
        }
        self.notify_milestones(previous.as_ref(), &next, &delivery.striker);
        if innings_complete {
            self.notify(
                NoticeKind::InningsComplete,
                format!("{} innings complete", self.config.team_name(slot.side)),
                format!(
                    "{} {}/{} ({} overs)",
                    slot,
                    next.total_runs,
                    next.total_wickets,
                    next.overs()
                ),
            );
        }
        self.after_transition(previous_phase);
        self.publish();

        Ok(SubmitOutcome {
            entry: EntryRef::from(&entry),
            innings: next,
            over_complete,
            innings_complete,
            state: self.state.clone(),
        })
    }

    fn notify_milestones(&self, before: Option<&InningsStats>, after: &InningsStats, striker: &PlayerId) {
        let runs_before = before
            .and_then(|stats| stats.batsman(striker))
            .map_or(0, |b| b.runs);
        let Some(batter) = after.batsman(striker) else {
            return;
        };
        for milestone in MILESTONES {
            if runs_before < milestone && batter.runs >= milestone {
                self.notify(
                    NoticeKind::Milestone,
                    format!("{striker} reaches {milestone}"),
                    format!("{striker} {} ({} balls)", batter.runs, batter.balls),
                );
            }
        }
    }

    /// Remove the most recent delivery of the match and rebuild from the
    /// remaining ledger. Walks back across innings boundaries when the
    /// active innings has no deliveries.
    pub fn undo(&mut self) -> ScoringResult<InningsStats> {
        if self.state.abandoned {
            return Err(ScoringError::validation(
                "an abandoned match cannot be reopened",
            ));
        }
        let order = self.state.play_order();
        let position = order
            .iter()
            .position(|slot| *slot == self.state.current)
            .ok_or_else(|| ScoringError::Internal(format!("{} is not in play", self.state.current)))?;
        let mut target_slot = None;
        for slot in order[..=position].iter().rev() {
            if self.ledger.delivery_count(*slot)? > 0 {
                target_slot = Some(*slot);
                break;
            }
        }
        let slot = target_slot
            .ok_or_else(|| ScoringError::NotFound("no deliveries to undo".into()))?;

        let mut remaining = self.ledger.deliveries(slot)?;
        let removed = remaining
            .pop()
            .ok_or_else(|| ScoringError::NotFound(format!("innings {slot} is empty")))?;
        let context = self.context(slot);
        let rebuilt = ProjectionBuilder::project(&remaining, &context)?;
        let last_over_bowler = remaining
            .last()
            .filter(|last| last.is_legal() && rebuilt.legal_balls > 0 && rebuilt.ball_in_over() == 0)
            .map(|last| last.bowler.clone());
        let next_state = self.state.apply(&MatchEvent::DeliveryUndone {
            slot,
            removed: removed.clone(),
            last_over_bowler,
            target: context.target,
        })?;

        let popped = self.ledger.pop_last(slot)?;
        if popped.delivery != removed {
            return Err(ScoringError::Consistency(format!(
                "ledger head of {slot} changed during undo"
            )));
        }
        let slot_position = order.iter().position(|s| *s == slot).unwrap_or(position);
        let later: Vec<InningsSlot> = order[slot_position + 1..].to_vec();
        for stale in later {
            self.innings.remove(&stale);
        }
        self.innings.insert(slot, rebuilt.clone());
        let previous_phase = self.state.phase;
        self.state = next_state;
        info!(
            match_id = %self.match_id,
            slot = %slot,
            seq = removed.sequence,
            from = %previous_phase,
            to = %self.state.phase,
            "delivery undone"
        );

        if self.career_synced && !self.state.is_finished() {
            self.hooks.retract_career(self.match_id);
            self.career_synced = false;
        }
        self.publish();
        Ok(rebuilt)
    }

    pub fn assign_role(&mut self, field: RoleField, player: PlayerId) -> ScoringResult<()> {
        let batting = self.state.current.side;
        match field {
            RoleField::Striker | RoleField::NonStriker => {
                if !self.config.team(batting).playing_xi.contains(&player) {
                    return Err(ScoringError::validation(format!(
                        "{player} is not in the batting eleven"
                    )));
                }
                let out = self
                    .current_innings()
                    .and_then(|stats| stats.batsman(&player))
                    .is_some_and(|b| !b.not_out);
                if out {
                    return Err(ScoringError::validation(format!("{player} is already out")));
                }
            }
            RoleField::Bowler => {
                if !self.config.team(batting.other()).playing_xi.contains(&player) {
                    return Err(ScoringError::validation(format!(
                        "{player} is not in the bowling eleven"
                    )));
                }
            }
        }
        self.state = self.state.apply(&MatchEvent::RoleAssigned {
            field,
            player: player.clone(),
        })?;
        debug!(match_id = %self.match_id, role = %field, player = %player, "role assigned");
        self.publish();
        Ok(())
    }

    pub fn start_second_innings(&mut self) -> ScoringResult<()> {
        let previous_phase = self.state.phase;
        self.state = self.state.apply(&MatchEvent::SecondInningsStarted)?;
        self.open_current_innings();
        self.after_transition(previous_phase);
        self.publish();
        Ok(())
    }

    pub fn start_super_over(&mut self) -> ScoringResult<()> {
        let line = |side: Side| {
            self.innings
                .get(&InningsSlot::main(side))
                .map(|s| ScoreLine {
                    runs: s.total_runs,
                    wickets: s.total_wickets,
                    legal_balls: s.legal_balls,
                })
                .unwrap_or_default()
        };
        let main_score = MainMatchScore {
            team_a: line(Side::TeamA),
            team_b: line(Side::TeamB),
        };
        let previous_phase = self.state.phase;
        self.state = self
            .state
            .apply(&MatchEvent::SuperOverStarted { main_score })?;
        self.open_current_innings();
        self.after_transition(previous_phase);
        self.publish();
        Ok(())
    }

    pub fn finalize(&mut self, player_of_match: PlayerId) -> ScoringResult<()> {
        if self.config.side_of(&player_of_match).is_none() {
            return Err(ScoringError::validation(format!(
                "{player_of_match} did not play in this match"
            )));
        }
        let previous_phase = self.state.phase;
        self.state = self
            .state
            .apply(&MatchEvent::Finalized { player_of_match })?;
        self.after_transition(previous_phase);
        self.publish();
        Ok(())
    }

    pub fn abandon(&mut self) -> ScoringResult<()> {
        let previous_phase = self.state.phase;
        self.state = self.state.apply(&MatchEvent::Abandoned)?;
        self.after_transition(previous_phase);
        self.publish();
        Ok(())
    }

    /// Re-derive every innings snapshot from the ledger, replacing the
    /// cache. Heals a snapshot left stale by an interrupted write.
    pub fn rebuild(&mut self) -> ScoringResult<()> {
        let mut rebuilt = BTreeMap::new();
        for slot in self.state.play_order() {
            if !self.innings.contains_key(&slot) && self.ledger.delivery_count(slot)? == 0 {
                continue;
            }
            // Chasing contexts read the opponent's rebuilt total.
            let context = self.context(slot);
            let replay = ReplayEngine::replay_innings(&self.ledger, &context)?;
            self.innings.insert(slot, replay.stats.clone());
            rebuilt.insert(slot, replay.stats);
        }
        self.innings = rebuilt;
        self.publish();
        Ok(())
    }

    /// Whether every cached snapshot agrees with a full replay.
    pub fn verify(&self) -> ScoringResult<bool> {
        for (slot, cached) in &self.innings {
            let context = self.context(*slot);
            if !ReplayEngine::verify_convergence(&self.ledger, &context, cached)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn open_current_innings(&mut self) {
        let slot = self.state.current;
        let context = self.context(slot);
        self.innings.insert(slot, ProjectionBuilder::empty(&context));
    }

    fn after_transition(&mut self, previous: MatchPhase) {
        let phase = self.state.phase;
        if phase != previous {
            info!(
                match_id = %self.match_id,
                slot = %self.state.current,
                from = %previous,
                to = %phase,
                "match phase changed"
            );
        }
        if phase == MatchPhase::Finished && !self.career_synced {
            let result = self.result();
            self.notify(
                NoticeKind::MatchComplete,
                "Match complete".into(),
                if result.summary.is_empty() {
                    "Result pending".into()
                } else {
                    result.summary.clone()
                },
            );
            self.hooks.sync_career(CareerRecord {
                match_id: self.match_id,
                result,
                innings: self.all_innings(),
            });
            self.career_synced = true;
        }
    }

    fn notify(&self, kind: NoticeKind, title: String, body: String) {
        self.hooks.notify(Notification {
            match_id: self.match_id,
            kind,
            title,
            body,
        });
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}

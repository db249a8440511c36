use crick_types::{
    format_overs, Delivery, Extras, InningsSlot, PlayerId, PlayingXi, BALLS_PER_OVER,
};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Fixed inputs of an innings projection: who may bat, how long the
/// innings can run, and what the batting side is chasing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsContext {
    pub slot: InningsSlot,
    pub batting_xi: PlayingXi,
    pub overs_limit: u32,
    pub max_wickets: u32,
    pub target: Option<u32>,
}

impl InningsContext {
    pub fn new(slot: InningsSlot, batting_xi: PlayingXi, overs_limit: u32) -> Self {
        let max_wickets = batting_xi.max_wickets();
        Self {
            slot,
            batting_xi,
            overs_limit,
            max_wickets,
            target: None,
        }
    }

    /// Lower the all-out bound (super overs close at two wickets).
    pub fn with_wicket_cap(mut self, cap: u32) -> Self {
        self.max_wickets = self.max_wickets.min(cap);
        self
    }

    pub fn with_target(mut self, target: Option<u32>) -> Self {
        self.target = target;
        self
    }

    pub fn ball_limit(&self) -> u32 {
        self.overs_limit.saturating_mul(BALLS_PER_OVER)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatsmanStats {
    pub player: PlayerId,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub strike_rate: f64,
    pub not_out: bool,
    pub dismissal: Option<String>,
}

impl BatsmanStats {
    fn new(player: PlayerId) -> Self {
        Self {
            player,
            runs: 0,
            balls: 0,
            fours: 0,
            sixes: 0,
            strike_rate: 0.0,
            not_out: true,
            dismissal: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BowlerStats {
    pub player: PlayerId,
    pub balls_bowled: u32,
    pub overs: String,
    pub maidens: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub economy: f64,
    pub average: Option<f64>,
    pub strike_rate: Option<f64>,
}

impl BowlerStats {
    fn new(player: PlayerId) -> Self {
        Self {
            player,
            balls_bowled: 0,
            overs: format_overs(0),
            maidens: 0,
            runs_conceded: 0,
            wickets: 0,
            economy: 0.0,
            average: None,
            strike_rate: None,
        }
    }

    fn refresh(&mut self) {
        self.overs = format_overs(self.balls_bowled);
        self.economy = per_over(self.runs_conceded, self.balls_bowled);
        self.average = (self.wickets > 0).then(|| self.runs_conceded as f64 / self.wickets as f64);
        self.strike_rate =
            (self.wickets > 0).then(|| self.balls_bowled as f64 / self.wickets as f64);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallOfWicket {
    pub wicket_number: u32,
    pub batsman: PlayerId,
    pub score_at_fall: u32,
    pub over_at_fall: String,
}

/// Running partnership for the current pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partnership {
    pub runs: u32,
    pub balls: u32,
}

/// Over-by-over record, used for the recent-overs strip and maidens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverSummary {
    /// 1-based over number.
    pub number: u32,
    pub bowler: PlayerId,
    /// Another bowler finished the over; it cannot be anyone's maiden.
    pub shared: bool,
    pub badges: Vec<String>,
    pub legal_balls: u32,
    pub runs: u32,
    pub bowler_runs: u32,
    pub complete: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastBallSummary {
    pub runs: u32,
    pub wicket: bool,
    pub boundary: bool,
}

/// Derived statistics of one innings. Never edited by hand: produced by
/// folding the innings ledger through [`ProjectionBuilder`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InningsStats {
    pub slot: InningsSlot,
    pub overs_limit: u32,
    pub max_wickets: u32,
    pub target: Option<u32>,
    /// Sequence of the last delivery folded in.
    pub last_sequence: u64,
    pub total_runs: u32,
    pub total_wickets: u32,
    pub legal_balls: u32,
    pub extras: Extras,
    pub current_run_rate: f64,
    pub required_run_rate: Option<f64>,
    pub projected_total: u32,
    pub remaining_balls: u32,
    pub batsman_stats: Vec<BatsmanStats>,
    pub bowler_stats: Vec<BowlerStats>,
    pub fall_of_wickets: Vec<FallOfWicket>,
    pub partnership: Partnership,
    pub recent_overs: Vec<OverSummary>,
    pub last_ball: Option<LastBallSummary>,
}

impl InningsStats {
    pub fn overs(&self) -> String {
        format_overs(self.legal_balls)
    }

    /// Completed overs.
    pub fn over_number(&self) -> u32 {
        self.legal_balls / BALLS_PER_OVER
    }

    /// Legal balls into the current over; 0 right after an over completes.
    pub fn ball_in_over(&self) -> u32 {
        self.legal_balls % BALLS_PER_OVER
    }

    pub fn is_all_out(&self) -> bool {
        self.total_wickets >= self.max_wickets
    }

    pub fn ball_limit(&self) -> u32 {
        self.overs_limit.saturating_mul(BALLS_PER_OVER)
    }

    pub fn overs_exhausted(&self) -> bool {
        self.legal_balls >= self.ball_limit()
    }

    pub fn target_reached(&self) -> bool {
        self.target.is_some_and(|t| self.total_runs >= t)
    }

    pub fn has_started(&self) -> bool {
        self.last_sequence > 0
    }

    /// Wickets the batting side still has in hand.
    pub fn wickets_in_hand(&self) -> u32 {
        self.max_wickets.saturating_sub(self.total_wickets)
    }

    pub fn batsman(&self, player: &PlayerId) -> Option<&BatsmanStats> {
        self.batsman_stats.iter().find(|b| &b.player == player)
    }

    pub fn bowler(&self, player: &PlayerId) -> Option<&BowlerStats> {
        self.bowler_stats.iter().find(|b| &b.player == player)
    }

    /// Badges of the over in progress (empty between overs).
    pub fn current_over_badges(&self) -> &[String] {
        match self.recent_overs.last() {
            Some(over) if !over.complete => &over.badges,
            _ => &[],
        }
    }

    fn batsman_mut(&mut self, player: &PlayerId) -> &mut BatsmanStats {
        let index = match self.batsman_stats.iter().position(|b| &b.player == player) {
            Some(index) => index,
            None => {
                self.batsman_stats.push(BatsmanStats::new(player.clone()));
                self.batsman_stats.len() - 1
            }
        };
        &mut self.batsman_stats[index]
    }

    fn bowler_mut(&mut self, player: &PlayerId) -> &mut BowlerStats {
        let index = match self.bowler_stats.iter().position(|b| &b.player == player) {
            Some(index) => index,
            None => {
                self.bowler_stats.push(BowlerStats::new(player.clone()));
                self.bowler_stats.len() - 1
            }
        };
        &mut self.bowler_stats[index]
    }

    fn refresh_rates(&mut self) {
        self.current_run_rate = per_over(self.total_runs, self.legal_balls);
        self.remaining_balls = self.ball_limit().saturating_sub(self.legal_balls);
        self.required_run_rate = self.target.and_then(|target| {
            let needed = target.saturating_sub(self.total_runs);
            (needed > 0 && self.remaining_balls > 0)
                .then(|| per_over(needed, self.remaining_balls))
        });
        self.projected_total = if self.legal_balls == 0 {
            0
        } else {
            let balls = self.ball_limit() as f64;
            (self.total_runs as f64 / self.legal_balls as f64 * balls).round() as u32
        };
    }
}

/// Runs per six-ball over; 0 when no legal balls have been bowled.
fn per_over(runs: u32, legal_balls: u32) -> f64 {
    if legal_balls == 0 {
        0.0
    } else {
        runs as f64 * BALLS_PER_OVER as f64 / legal_balls as f64
    }
}

fn strike_rate(runs: u32, balls: u32) -> f64 {
    if balls == 0 {
        0.0
    } else {
        runs as f64 / balls as f64 * 100.0
    }
}

/// The innings projection engine.
///
/// `project` is a full replay over an ordered ledger; `apply` folds one
/// delivery into an existing snapshot. `project` is defined as repeated
/// `apply` from [`ProjectionBuilder::empty`], so both paths yield
/// identical snapshots for the same ledger.
pub struct ProjectionBuilder;

impl ProjectionBuilder {
    pub fn empty(context: &InningsContext) -> InningsStats {
        let mut stats = InningsStats {
            slot: context.slot,
            overs_limit: context.overs_limit,
            max_wickets: context.max_wickets,
            target: context.target,
            last_sequence: 0,
            total_runs: 0,
            total_wickets: 0,
            legal_balls: 0,
            extras: Extras::default(),
            current_run_rate: 0.0,
            required_run_rate: None,
            projected_total: 0,
            remaining_balls: 0,
            batsman_stats: Vec::new(),
            bowler_stats: Vec::new(),
            fall_of_wickets: Vec::new(),
            partnership: Partnership::default(),
            recent_overs: Vec::new(),
            last_ball: None,
        };
        stats.refresh_rates();
        stats
    }

    /// Full replay of an ordered delivery sequence.
    pub fn project(
        deliveries: &[Delivery],
        context: &InningsContext,
    ) -> Result<InningsStats, LedgerError> {
        let mut stats = Self::empty(context);
        for delivery in deliveries {
            Self::apply(&mut stats, delivery, context)?;
        }
        Ok(stats)
    }

    /// Fold one delivery into `stats`. On error `stats` is left untouched.
    pub fn apply(
        stats: &mut InningsStats,
        delivery: &Delivery,
        context: &InningsContext,
    ) -> Result<(), LedgerError> {
        Self::check(stats, delivery, context)?;

        let total = delivery.total_runs();
        let legal = delivery.is_legal();

        stats.last_sequence = delivery.sequence;
        stats.total_runs += total;
        stats.extras.accumulate(&delivery.extras);
        if legal {
            stats.legal_balls += 1;
            stats.partnership.balls += 1;
        }
        stats.partnership.runs += total;

        if delivery.counts_as_ball_faced() {
            let batter = stats.batsman_mut(&delivery.striker);
            batter.runs += delivery.runs_off_bat;
            batter.balls += 1;
            if delivery.boundary && delivery.runs_off_bat == 4 {
                batter.fours += 1;
            }
            if delivery.boundary && delivery.runs_off_bat == 6 {
                batter.sixes += 1;
            }
            batter.strike_rate = strike_rate(batter.runs, batter.balls);
        }

        {
            let bowler = stats.bowler_mut(&delivery.bowler);
            if legal {
                bowler.balls_bowled += 1;
            }
            bowler.runs_conceded += delivery.bowler_runs();
            if delivery.wicket_credited_to_bowler() {
                bowler.wickets += 1;
            }
            bowler.refresh();
        }

        if let Some(wicket) = &delivery.wicket {
            stats.total_wickets += 1;
            let batter = stats.batsman_mut(&wicket.dismissed);
            batter.not_out = false;
            batter.dismissal = Some(wicket.dismissal_text(&delivery.bowler));
            stats.fall_of_wickets.push(FallOfWicket {
                wicket_number: stats.total_wickets,
                batsman: wicket.dismissed.clone(),
                score_at_fall: stats.total_runs,
                over_at_fall: format_overs(stats.legal_balls),
            });
            stats.partnership = Partnership::default();
        }

        Self::record_over(stats, delivery);

        stats.last_ball = Some(LastBallSummary {
            runs: total,
            wicket: delivery.wicket.is_some(),
            boundary: delivery.boundary,
        });
        stats.refresh_rates();
        Ok(())
    }

    fn check(
        stats: &InningsStats,
        delivery: &Delivery,
        context: &InningsContext,
    ) -> Result<(), LedgerError> {
        let fail = |reason: String| LedgerError::Consistency {
            seq: delivery.sequence,
            reason,
        };

        if delivery.sequence != stats.last_sequence + 1 {
            return Err(fail(format!(
                "expected delivery {}, got {}",
                stats.last_sequence + 1,
                delivery.sequence
            )));
        }
        if let Some(reason) = delivery.malformation() {
            return Err(fail(reason.into()));
        }
        if stats.total_wickets >= context.max_wickets {
            return Err(fail(format!(
                "innings already closed at {} wickets",
                stats.total_wickets
            )));
        }
        for batter in [&delivery.striker, &delivery.non_striker] {
            if !context.batting_xi.contains(batter) {
                return Err(fail(format!("{batter} is not in the batting eleven")));
            }
        }
        if context.batting_xi.contains(&delivery.bowler) {
            return Err(fail(format!(
                "bowler {} belongs to the batting side",
                delivery.bowler
            )));
        }
        if let Some(wicket) = &delivery.wicket {
            let already_out = stats
                .batsman(&wicket.dismissed)
                .is_some_and(|b| !b.not_out);
            if already_out {
                return Err(fail(format!("{} is already out", wicket.dismissed)));
            }
        }
        for batter in [&delivery.striker, &delivery.non_striker] {
            if stats.batsman(batter).is_some_and(|b| !b.not_out) {
                return Err(fail(format!("{batter} is out and cannot bat again")));
            }
        }
        Ok(())
    }

    fn record_over(stats: &mut InningsStats, delivery: &Delivery) {
        let needs_new_over = stats.recent_overs.last().map_or(true, |over| over.complete);
        if needs_new_over {
            let number = stats.recent_overs.len() as u32 + 1;
            stats.recent_overs.push(OverSummary {
                number,
                bowler: delivery.bowler.clone(),
                shared: false,
                badges: Vec::new(),
                legal_balls: 0,
                runs: 0,
                bowler_runs: 0,
                complete: false,
            });
        }

        let Some(over) = stats.recent_overs.last_mut() else {
            return;
        };
        if over.bowler != delivery.bowler {
            over.shared = true;
        }
        over.badges.push(delivery.badge());
        over.runs += delivery.total_runs();
        over.bowler_runs += delivery.bowler_runs();
        if delivery.is_legal() {
            over.legal_balls += 1;
        }
        if over.legal_balls < BALLS_PER_OVER {
            return;
        }
        over.complete = true;
        let maiden = !over.shared && over.bowler_runs == 0;
        let bowler = over.bowler.clone();
        if maiden {
            let stats_entry = stats.bowler_mut(&bowler);
            stats_entry.maidens += 1;
        }
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;

/// Upper bound on the runs one delivery can add, extras included.
pub const MAX_RUNS_PER_DELIVERY: u32 = 12;

/// Extras buckets for a single delivery (or summed over an innings).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extras {
    /// Wide runs, including the one-run penalty.
    pub wides: u32,
    /// No-ball penalty runs (runs off the bat are not included).
    pub no_balls: u32,
    pub byes: u32,
    pub leg_byes: u32,
    pub penalty: u32,
}

impl Extras {
    pub fn total(&self) -> u32 {
        self.wides + self.no_balls + self.byes + self.leg_byes + self.penalty
    }

    /// Bucket-wise sum, used when aggregating an innings.
    pub fn accumulate(&mut self, other: &Extras) {
        self.wides += other.wides;
        self.no_balls += other.no_balls;
        self.byes += other.byes;
        self.leg_byes += other.leg_byes;
        self.penalty += other.penalty;
    }
}

/// The extras category a delivery belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtraKind {
    /// No extras: runs, if any, came off the bat.
    Normal,
    Wide,
    NoBall,
    Bye,
    LegBye,
    Penalty,
}

/// How a batter was dismissed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WicketKind {
    Bowled,
    Caught,
    CaughtAndBowled,
    Lbw,
    Stumped,
    HitWicket,
    RunOut,
    ObstructingField,
    HitBallTwice,
    TimedOut,
    RetiredOut,
}

impl WicketKind {
    /// Whether the dismissal counts toward the bowler's wicket tally.
    pub fn credited_to_bowler(self) -> bool {
        matches!(
            self,
            Self::Bowled
                | Self::Caught
                | Self::CaughtAndBowled
                | Self::Lbw
                | Self::Stumped
                | Self::HitWicket
        )
    }

    /// Run-out class dismissals: the only kinds that may carry runs
    /// completed on the same delivery.
    pub fn is_run_out_class(self) -> bool {
        matches!(
            self,
            Self::RunOut | Self::ObstructingField | Self::HitBallTwice
        )
    }

    /// Dismissals that happen on a bowled ball. Timed out and retired out
    /// are recorded between deliveries, so no ball carries them.
    pub fn occurs_on_delivery(self) -> bool {
        !matches!(self, Self::TimedOut | Self::RetiredOut)
    }

    /// Dismissals that remain possible on a free hit.
    pub fn allowed_on_free_hit(self) -> bool {
        self.is_run_out_class()
    }

    /// Dismissals where the striker is necessarily the batter out.
    pub fn dismisses_striker_only(self) -> bool {
        matches!(
            self,
            Self::Bowled
                | Self::Caught
                | Self::CaughtAndBowled
                | Self::Lbw
                | Self::Stumped
                | Self::HitWicket
                | Self::HitBallTwice
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bowled => "bowled",
            Self::Caught => "caught",
            Self::CaughtAndBowled => "caught-and-bowled",
            Self::Lbw => "lbw",
            Self::Stumped => "stumped",
            Self::HitWicket => "hit-wicket",
            Self::RunOut => "run-out",
            Self::ObstructingField => "obstructing-field",
            Self::HitBallTwice => "hit-ball-twice",
            Self::TimedOut => "timed-out",
            Self::RetiredOut => "retired-out",
        }
    }
}

impl fmt::Display for WicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dismissal recorded against a delivery.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wicket {
    pub kind: WicketKind,
    pub dismissed: PlayerId,
    pub credited_to_bowler: bool,
    pub fielder: Option<PlayerId>,
}

impl Wicket {
    /// A wicket with bowler credit derived from its kind.
    pub fn new(kind: WicketKind, dismissed: PlayerId) -> Self {
        Self {
            kind,
            dismissed,
            credited_to_bowler: kind.credited_to_bowler(),
            fielder: None,
        }
    }

    pub fn with_fielder(mut self, fielder: PlayerId) -> Self {
        self.fielder = Some(fielder);
        self
    }

    /// ICC scorecard dismissal text, using player ids as names.
    pub fn dismissal_text(&self, bowler: &PlayerId) -> String {
        let fielder = self.fielder.as_ref();
        match (self.kind, fielder) {
            (WicketKind::Bowled, _) => format!("b {bowler}"),
            (WicketKind::Caught, Some(f)) => format!("c {f} b {bowler}"),
            (WicketKind::Caught, None) => format!("c ? b {bowler}"),
            (WicketKind::CaughtAndBowled, _) => format!("c & b {bowler}"),
            (WicketKind::Lbw, _) => format!("lbw b {bowler}"),
            (WicketKind::Stumped, Some(f)) => format!("st {f} b {bowler}"),
            (WicketKind::Stumped, None) => format!("st b {bowler}"),
            (WicketKind::HitWicket, _) => format!("hit wicket b {bowler}"),
            (WicketKind::RunOut, Some(f)) => format!("run out ({f})"),
            (WicketKind::RunOut, None) => "run out".into(),
            (WicketKind::ObstructingField, _) => "obstructing the field".into(),
            (WicketKind::HitBallTwice, _) => "hit the ball twice".into(),
            (WicketKind::TimedOut, _) => "timed out".into(),
            (WicketKind::RetiredOut, _) => "retired out".into(),
        }
    }
}

/// One bowled event: the atomic unit of the ball ledger.
///
/// A delivery is immutable once appended. Corrections go through
/// delete-and-replay, never in-place edits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delivery {
    /// Position within the innings ledger, starting at 1.
    pub sequence: u64,
    pub striker: PlayerId,
    pub non_striker: PlayerId,
    pub bowler: PlayerId,
    pub runs_off_bat: u32,
    pub extras: Extras,
    /// The runs reached the rope; boundaries never rotate strike.
    pub boundary: bool,
    /// Bowled under free-hit conditions.
    pub free_hit: bool,
    pub wicket: Option<Wicket>,
}

impl Delivery {
    pub fn is_wide(&self) -> bool {
        self.extras.wides > 0
    }

    pub fn is_no_ball(&self) -> bool {
        self.extras.no_balls > 0
    }

    /// Counts toward the six-ball over.
    pub fn is_legal(&self) -> bool {
        !self.is_wide() && !self.is_no_ball()
    }

    /// Wides are not a ball faced; no-balls are.
    pub fn counts_as_ball_faced(&self) -> bool {
        !self.is_wide()
    }

    pub fn total_runs(&self) -> u32 {
        self.runs_off_bat + self.extras.total()
    }

    /// Runs charged to the bowler: off the bat plus wides and no-balls.
    pub fn bowler_runs(&self) -> u32 {
        self.runs_off_bat + self.extras.wides + self.extras.no_balls
    }

    pub fn wicket_credited_to_bowler(&self) -> bool {
        self.wicket.as_ref().is_some_and(|w| w.credited_to_bowler)
    }

    /// Runs physically run or hit, excluding the automatic wide/no-ball
    /// penalty and penalty awards.
    pub fn running_runs(&self) -> u32 {
        self.runs_off_bat
            + self.extras.byes
            + self.extras.leg_byes
            + self.extras.wides.saturating_sub(1)
    }

    /// Whether the batters end the delivery at swapped ends.
    ///
    /// Over-end swaps are not included; they compose on top of this.
    pub fn rotates_strike(&self) -> bool {
        self.wicket.is_none() && !self.boundary && self.running_runs() % 2 == 1
    }

    /// Primary extras category. A no-ball with byes or leg-byes reports
    /// [`ExtraKind::NoBall`].
    pub fn extra_kind(&self) -> ExtraKind {
        let e = &self.extras;
        if e.wides > 0 {
            ExtraKind::Wide
        } else if e.no_balls > 0 {
            ExtraKind::NoBall
        } else if e.byes > 0 {
            ExtraKind::Bye
        } else if e.leg_byes > 0 {
            ExtraKind::LegBye
        } else if e.penalty > 0 {
            ExtraKind::Penalty
        } else {
            ExtraKind::Normal
        }
    }

    /// Describes the first structural rule this delivery breaks, if any.
    pub fn malformation(&self) -> Option<&'static str> {
        let e = &self.extras;
        let runs: u64 = [self.runs_off_bat, e.wides, e.no_balls, e.byes, e.leg_byes, e.penalty]
            .iter()
            .map(|v| u64::from(*v))
            .sum();
        if runs > u64::from(MAX_RUNS_PER_DELIVERY) {
            return Some("more runs than a single delivery can produce");
        }
        let active = [e.wides, e.no_balls, e.byes, e.leg_byes, e.penalty]
            .iter()
            .filter(|v| **v > 0)
            .count();
        let no_ball_combo = e.no_balls > 0
            && active == 2
            && (e.byes > 0) != (e.leg_byes > 0);
        if active > 1 && !no_ball_combo {
            return Some("more than one extras category is active");
        }
        if e.no_balls > 1 {
            return Some("a no-ball carries exactly one penalty run");
        }
        if self.runs_off_bat > 0 && (e.wides > 0 || e.byes > 0 || e.leg_byes > 0 || e.penalty > 0)
        {
            return Some("runs off the bat are not allowed with wides, byes, leg-byes or penalties");
        }
        if let Some(w) = &self.wicket {
            if !w.kind.occurs_on_delivery() {
                return Some("this dismissal kind is not recorded against a delivery");
            }
            if !w.kind.is_run_out_class() && self.runs_off_bat > 0 {
                return Some("runs off the bat are not allowed with a standard dismissal");
            }
            if w.kind.dismisses_striker_only() && w.dismissed != self.striker {
                return Some("this dismissal kind can only dismiss the striker");
            }
            if w.dismissed != self.striker && w.dismissed != self.non_striker {
                return Some("dismissed player is not at the crease");
            }
        }
        if self.striker == self.non_striker {
            return Some("striker and non-striker are the same player");
        }
        None
    }

    /// Compact scoring badge: `·`, `1`, `4`, `W`, `Wd`, `Nb3`, `2lb`, `1b`, `5p`.
    pub fn badge(&self) -> String {
        if self.wicket.is_some() {
            return "W".into();
        }
        let e = &self.extras;
        if e.wides > 0 {
            return if e.wides > 1 {
                format!("Wd{}", e.wides)
            } else {
                "Wd".into()
            };
        }
        if e.no_balls > 0 {
            let total = self.total_runs();
            return if total > 1 {
                format!("Nb{total}")
            } else {
                "Nb".into()
            };
        }
        if e.leg_byes > 0 {
            return format!("{}lb", e.leg_byes);
        }
        if e.byes > 0 {
            return format!("{}b", e.byes);
        }
        if e.penalty > 0 {
            return format!("{}p", e.penalty);
        }
        if self.runs_off_bat == 0 {
            "·".into()
        } else {
            self.runs_off_bat.to_string()
        }
    }
}

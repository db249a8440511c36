//! Operator scoring payloads and their normalization into ledger deliveries.

use crick_types::{Delivery, Extras, PlayerId, Wicket, WicketKind, MAX_RUNS_PER_DELIVERY};
use serde::{Deserialize, Serialize};

use crate::error::{ScoringError, ScoringResult};

/// Extras category picked by the scorer for one delivery.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtraSelection {
    #[default]
    None,
    Wide,
    NoBall,
    /// No-ball where the batters ran byes.
    NoBallBye,
    /// No-ball where the batters ran leg-byes.
    NoBallLegBye,
    Bye,
    LegBye,
    Penalty,
}

/// Which batter at the crease a wicket input refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Batter {
    Striker,
    NonStriker,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WicketInput {
    pub kind: WicketKind,
    pub dismissed: Batter,
    #[serde(default)]
    pub fielder: Option<PlayerId>,
    /// Overrides the bowler credit derived from `kind`.
    #[serde(default)]
    pub credited_to_bowler: Option<bool>,
}

impl WicketInput {
    pub fn new(kind: WicketKind, dismissed: Batter) -> Self {
        Self {
            kind,
            dismissed,
            fielder: None,
            credited_to_bowler: None,
        }
    }

    pub fn with_fielder(mut self, fielder: impl Into<PlayerId>) -> Self {
        self.fielder = Some(fielder.into());
        self
    }
}

/// What the operator entered for one ball, before normalization.
///
/// `runs` is the single numeric value from the run pad. Where it lands
/// depends on `extra`: off the bat for normal balls and no-balls, in the
/// wide, bye, leg-bye or penalty bucket otherwise.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringInput {
    #[serde(default)]
    pub runs: u32,
    #[serde(default)]
    pub extra: ExtraSelection,
    /// Explicit boundary flag; derived from the runs when absent.
    #[serde(default)]
    pub boundary: Option<bool>,
    #[serde(default)]
    pub wicket: Option<WicketInput>,
}

impl ScoringInput {
    pub fn dot() -> Self {
        Self::default()
    }

    pub fn runs(runs: u32) -> Self {
        Self {
            runs,
            ..Self::default()
        }
    }

    /// A wide with `runs` run or scampered on top of the automatic one.
    pub fn wide(runs: u32) -> Self {
        Self {
            runs,
            extra: ExtraSelection::Wide,
            ..Self::default()
        }
    }

    /// A no-ball with `runs` off the bat.
    pub fn no_ball(runs: u32) -> Self {
        Self {
            runs,
            extra: ExtraSelection::NoBall,
            ..Self::default()
        }
    }

    pub fn byes(runs: u32) -> Self {
        Self {
            runs,
            extra: ExtraSelection::Bye,
            ..Self::default()
        }
    }

    pub fn leg_byes(runs: u32) -> Self {
        Self {
            runs,
            extra: ExtraSelection::LegBye,
            ..Self::default()
        }
    }

    pub fn penalty(runs: u32) -> Self {
        Self {
            runs,
            extra: ExtraSelection::Penalty,
            ..Self::default()
        }
    }

    pub fn with_boundary(mut self, boundary: bool) -> Self {
        self.boundary = Some(boundary);
        self
    }

    pub fn with_wicket(mut self, wicket: WicketInput) -> Self {
        self.wicket = Some(wicket);
        self
    }

    /// Turn the payload into the delivery that will be appended.
    ///
    /// Standard dismissals drop every run the operator pre-selected; only
    /// the automatic wide or no-ball run survives. Run-out class
    /// dismissals keep completed runs.
    pub fn normalize(
        &self,
        sequence: u64,
        striker: &PlayerId,
        non_striker: &PlayerId,
        bowler: &PlayerId,
        free_hit: bool,
    ) -> ScoringResult<Delivery> {
        if self.runs > MAX_RUNS_PER_DELIVERY {
            return Err(ScoringError::validation(format!(
                "{} runs cannot come from one delivery (at most {MAX_RUNS_PER_DELIVERY})",
                self.runs
            )));
        }
        let standard_dismissal = self
            .wicket
            .as_ref()
            .is_some_and(|w| !w.kind.is_run_out_class());
        let runs = if standard_dismissal { 0 } else { self.runs };

        let mut extras = Extras::default();
        let mut runs_off_bat = 0;
        match self.extra {
            ExtraSelection::None => runs_off_bat = runs,
            ExtraSelection::Wide => extras.wides = 1 + runs,
            ExtraSelection::NoBall => {
                extras.no_balls = 1;
                runs_off_bat = runs;
            }
            ExtraSelection::NoBallBye => {
                extras.no_balls = 1;
                extras.byes = runs;
            }
            ExtraSelection::NoBallLegBye => {
                extras.no_balls = 1;
                extras.leg_byes = runs;
            }
            ExtraSelection::Bye => extras.byes = runs,
            ExtraSelection::LegBye => extras.leg_byes = runs,
            ExtraSelection::Penalty => {
                if runs == 0 {
                    return Err(ScoringError::validation(
                        "a penalty award needs a positive run value",
                    ));
                }
                extras.penalty = runs;
            }
        }

        let reaches_rope = matches!(runs, 4 | 6) && self.extra != ExtraSelection::Penalty;
        let boundary = match self.boundary {
            Some(true) if !reaches_rope => {
                return Err(ScoringError::validation(format!(
                    "a boundary is worth 4 or 6, not {runs}"
                )));
            }
            Some(flag) => flag,
            None => reaches_rope,
        };

        let wicket = match &self.wicket {
            None => None,
            Some(input) => {
                if !input.kind.occurs_on_delivery() {
                    return Err(ScoringError::validation(format!(
                        "{} is not recorded against a delivery",
                        input.kind
                    )));
                }
                if free_hit && !input.kind.allowed_on_free_hit() {
                    return Err(ScoringError::validation(format!(
                        "{} is not a valid dismissal on a free hit",
                        input.kind
                    )));
                }
                if input.kind.dismisses_striker_only() && input.dismissed != Batter::Striker {
                    return Err(ScoringError::validation(format!(
                        "{} can only dismiss the striker",
                        input.kind
                    )));
                }
                let dismissed = match input.dismissed {
                    Batter::Striker => striker.clone(),
                    Batter::NonStriker => non_striker.clone(),
                };
                let mut wicket = Wicket::new(input.kind, dismissed);
                if let Some(credit) = input.credited_to_bowler {
                    wicket.credited_to_bowler = credit;
                }
                wicket.fielder = input.fielder.clone();
                Some(wicket)
            }
        };

        let delivery = Delivery {
            sequence,
            striker: striker.clone(),
            non_striker: non_striker.clone(),
            bowler: bowler.clone(),
            runs_off_bat,
            extras,
            boundary: boundary && !standard_dismissal,
            free_hit,
            wicket,
        };
        if let Some(reason) = delivery.malformation() {
            return Err(ScoringError::validation(reason));
        }
        Ok(delivery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(input: &ScoringInput, free_hit: bool) -> ScoringResult<Delivery> {
        input.normalize(1, &"s".into(), &"n".into(), &"b".into(), free_hit)
    }

    #[test]
    fn wide_runs_move_into_wide_bucket() {
        let d = normalize(&ScoringInput::wide(2), false).unwrap();
        assert_eq!(d.extras.wides, 3);
        assert_eq!(d.runs_off_bat, 0);
        assert_eq!(d.total_runs(), 3);
        assert!(!d.boundary);
    }

    #[test]
    fn byes_never_reach_the_bat() {
        let d = normalize(&ScoringInput::leg_byes(4), false).unwrap();
        assert_eq!(d.runs_off_bat, 0);
        assert_eq!(d.extras.leg_byes, 4);
        assert!(d.boundary);
        assert!(d.is_legal());
    }

    #[test]
    fn no_ball_keeps_bat_runs() {
        let d = normalize(&ScoringInput::no_ball(6), false).unwrap();
        assert_eq!(d.extras.no_balls, 1);
        assert_eq!(d.runs_off_bat, 6);
        assert!(d.boundary);
        assert_eq!(d.total_runs(), 7);

        let mut combo = ScoringInput::byes(2);
        combo.extra = ExtraSelection::NoBallBye;
        let d = normalize(&combo, false).unwrap();
        assert_eq!((d.extras.no_balls, d.extras.byes), (1, 2));
    }

    #[test]
    fn standard_dismissal_zeroes_runs() {
        let input = ScoringInput::runs(3)
            .with_wicket(WicketInput::new(WicketKind::Caught, Batter::Striker).with_fielder("f"));
        let d = normalize(&input, false).unwrap();
        assert_eq!(d.runs_off_bat, 0);
        let wicket = d.wicket.unwrap();
        assert!(wicket.credited_to_bowler);
        assert_eq!(wicket.dismissed, PlayerId::new("s"));
        assert_eq!(wicket.fielder, Some(PlayerId::new("f")));

        let stumped_wide = ScoringInput::wide(1)
            .with_wicket(WicketInput::new(WicketKind::Stumped, Batter::Striker));
        assert_eq!(normalize(&stumped_wide, false).unwrap().extras.wides, 1);
    }

    #[test]
    fn run_out_keeps_completed_runs() {
        let input = ScoringInput::runs(1)
            .with_wicket(WicketInput::new(WicketKind::RunOut, Batter::NonStriker));
        let d = normalize(&input, false).unwrap();
        assert_eq!(d.runs_off_bat, 1);
        let wicket = d.wicket.unwrap();
        assert!(!wicket.credited_to_bowler);
        assert_eq!(wicket.dismissed, PlayerId::new("n"));
    }

    #[test]
    fn free_hit_allows_run_out_class_only() {
        let bowled = ScoringInput::dot()
            .with_wicket(WicketInput::new(WicketKind::Bowled, Batter::Striker));
        let err = normalize(&bowled, true).unwrap_err();
        assert!(err.is_validation());
        assert!(normalize(&bowled, false).is_ok());

        for kind in [WicketKind::RunOut, WicketKind::ObstructingField] {
            let input = ScoringInput::dot().with_wicket(WicketInput::new(kind, Batter::NonStriker));
            let d = normalize(&input, true).unwrap();
            assert!(d.free_hit);
        }
    }

    #[test]
    fn striker_only_kinds_reject_non_striker() {
        let input = ScoringInput::dot()
            .with_wicket(WicketInput::new(WicketKind::Lbw, Batter::NonStriker));
        assert!(normalize(&input, false).unwrap_err().is_validation());
    }

    #[test]
    fn boundary_flag_must_match_runs() {
        assert!(normalize(&ScoringInput::runs(3).with_boundary(true), false).is_err());
        let all_run_four = normalize(&ScoringInput::runs(4).with_boundary(false), false).unwrap();
        assert!(!all_run_four.boundary);
        assert!(!normalize(&ScoringInput::penalty(5), false).unwrap().boundary);
        assert!(normalize(&ScoringInput::penalty(0), false).is_err());
    }

    #[test]
    fn unreasonable_run_values_are_refused() {
        for input in [
            ScoringInput::wide(u32::MAX),
            ScoringInput::runs(u32::MAX),
            ScoringInput::no_ball(u32::MAX),
            ScoringInput::byes(MAX_RUNS_PER_DELIVERY + 1),
            ScoringInput::penalty(u32::MAX),
            ScoringInput::wide(MAX_RUNS_PER_DELIVERY),
        ] {
            assert!(normalize(&input, false).unwrap_err().is_validation(), "{input:?}");
        }
        assert_eq!(normalize(&ScoringInput::runs(7), false).unwrap().runs_off_bat, 7);
    }

    #[test]
    fn timed_out_cannot_ride_on_a_delivery() {
        for kind in [WicketKind::TimedOut, WicketKind::RetiredOut] {
            let input = ScoringInput::dot().with_wicket(WicketInput::new(kind, Batter::Striker));
            assert!(normalize(&input, false).unwrap_err().is_validation());
        }
    }
}

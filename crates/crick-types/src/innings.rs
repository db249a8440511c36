use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// One of the two sides in a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    TeamA,
    TeamB,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Self::TeamA => Self::TeamB,
            Self::TeamB => Self::TeamA,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TeamA => "teamA",
            Self::TeamB => "teamB",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which contest an innings belongs to: the main match or the n-th super over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Main,
    /// Super over round, starting at 1.
    SuperOver(u32),
}

impl Stage {
    pub fn is_super_over(self) -> bool {
        matches!(self, Self::SuperOver(_))
    }

    /// The stage played after this one ends in a tie.
    pub fn next_super_over(self) -> Self {
        match self {
            Self::Main => Self::SuperOver(1),
            Self::SuperOver(round) => Self::SuperOver(round + 1),
        }
    }
}

/// Identifies one innings ledger: a side batting in a given stage.
///
/// The closed `Side x Stage` product replaces loosely typed labels such as
/// `teamA_super`. Labels are still produced and accepted for display and
/// storage keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InningsSlot {
    pub side: Side,
    pub stage: Stage,
}

impl InningsSlot {
    pub fn main(side: Side) -> Self {
        Self {
            side,
            stage: Stage::Main,
        }
    }

    pub fn super_over(side: Side, round: u32) -> Self {
        Self {
            side,
            stage: Stage::SuperOver(round),
        }
    }

    pub fn is_super_over(&self) -> bool {
        self.stage.is_super_over()
    }

    /// The slot of the opposing side in the same stage.
    pub fn opponent(&self) -> Self {
        Self {
            side: self.side.other(),
            stage: self.stage,
        }
    }

    pub fn label(&self) -> String {
        match self.stage {
            Stage::Main => self.side.label().to_string(),
            Stage::SuperOver(1) => format!("{}_super", self.side.label()),
            Stage::SuperOver(round) => format!("{}_super{round}", self.side.label()),
        }
    }
}

impl fmt::Display for InningsSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for InningsSlot {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidSlot(s.to_string());
        let (side_label, rest) = match s.split_once('_') {
            Some((side, rest)) => (side, Some(rest)),
            None => (s, None),
        };
        let side = match side_label {
            "teamA" => Side::TeamA,
            "teamB" => Side::TeamB,
            _ => return Err(invalid()),
        };
        let stage = match rest {
            None => Stage::Main,
            Some("super") => Stage::SuperOver(1),
            Some(rest) => {
                // Round 1 is spelled `_super`; later rounds carry canonical digits.
                let digits = rest.strip_prefix("super").ok_or_else(invalid)?;
                let round = digits
                    .parse::<u32>()
                    .ok()
                    .filter(|r| *r >= 2 && r.to_string() == digits)
                    .ok_or_else(invalid)?;
                Stage::SuperOver(round)
            }
        };
        Ok(Self { side, stage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_storage_keys() {
        assert_eq!(InningsSlot::main(Side::TeamA).label(), "teamA");
        assert_eq!(InningsSlot::super_over(Side::TeamB, 1).label(), "teamB_super");
        assert_eq!(InningsSlot::super_over(Side::TeamA, 3).label(), "teamA_super3");
    }

    #[test]
    fn labels_parse_back() {
        for slot in [
            InningsSlot::main(Side::TeamB),
            InningsSlot::super_over(Side::TeamA, 1),
            InningsSlot::super_over(Side::TeamB, 2),
        ] {
            assert_eq!(slot.label().parse::<InningsSlot>().unwrap(), slot);
        }
    }

    #[test]
    fn malformed_labels_are_rejected() {
        for bad in [
            "teamC",
            "teamA_",
            "teamA_super0",
            "teamA_super1",
            "teamB_super02",
            "teamB_super+2",
            "teamA_duper",
            "",
        ] {
            assert!(bad.parse::<InningsSlot>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn opponent_keeps_stage() {
        let slot = InningsSlot::super_over(Side::TeamA, 2);
        assert_eq!(slot.opponent(), InningsSlot::super_over(Side::TeamB, 2));
        assert_eq!(Stage::Main.next_super_over(), Stage::SuperOver(1));
        assert_eq!(Stage::SuperOver(1).next_super_over(), Stage::SuperOver(2));
    }
}

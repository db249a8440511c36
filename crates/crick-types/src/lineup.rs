use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::ids::PlayerId;

/// The nominated players eligible to bat and bowl for a side in one match.
///
/// Batting order is not implied by position; the order is kept only so
/// scorecards can list "did not bat" players the way the squad was named.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PlayerId>", into = "Vec<PlayerId>")]
pub struct PlayingXi {
    players: Vec<PlayerId>,
}

impl PlayingXi {
    /// Smallest side that can bat: one pair at the crease.
    pub const MIN_PLAYERS: usize = 2;

    pub fn new(players: Vec<PlayerId>) -> Result<Self, TypeError> {
        if players.len() < Self::MIN_PLAYERS {
            return Err(TypeError::LineupTooSmall {
                min: Self::MIN_PLAYERS,
                actual: players.len(),
            });
        }
        let mut seen = HashSet::with_capacity(players.len());
        for player in &players {
            if player.is_blank() {
                return Err(TypeError::BlankPlayerId);
            }
            if !seen.insert(player) {
                return Err(TypeError::DuplicatePlayer(player.to_string()));
            }
        }
        Ok(Self { players })
    }

    pub fn contains(&self, player: &PlayerId) -> bool {
        self.players.contains(player)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// All out: the innings ends when only one batter remains.
    pub fn max_wickets(&self) -> u32 {
        (self.players.len() as u32).saturating_sub(1)
    }

    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }
}

impl TryFrom<Vec<PlayerId>> for PlayingXi {
    type Error = TypeError;

    fn try_from(players: Vec<PlayerId>) -> Result<Self, Self::Error> {
        Self::new(players)
    }
}

impl From<PlayingXi> for Vec<PlayerId> {
    fn from(xi: PlayingXi) -> Self {
        xi.players
    }
}

use std::collections::HashSet;

use crick_types::{PlayerId, PlayingXi, Side};
use serde::{Deserialize, Serialize};

use crate::error::{ScoringError, ScoringResult};

/// Longest innings a match may be configured for, in overs.
pub const MAX_OVERS_LIMIT: u32 = 200;

/// One side's name and nominated eleven for this match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamConfig {
    pub name: String,
    pub playing_xi: PlayingXi,
}

/// Tiebreak format played after a tied match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperOverConfig {
    pub overs: u32,
    /// The super-over innings closes at this many wickets.
    pub max_wickets: u32,
}

impl Default for SuperOverConfig {
    fn default() -> Self {
        Self {
            overs: 1,
            max_wickets: 2,
        }
    }
}

/// Configuration for one limited-overs match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub team_a: TeamConfig,
    pub team_b: TeamConfig,
    /// Overs per side in the main innings.
    pub overs_limit: u32,
    /// Side batting first in the main match (decided by the toss).
    #[serde(default = "default_batting_first")]
    pub batting_first: Side,
    #[serde(default)]
    pub super_over: SuperOverConfig,
}

fn default_batting_first() -> Side {
    Side::TeamA
}

impl MatchConfig {
    pub fn new(team_a: TeamConfig, team_b: TeamConfig, overs_limit: u32) -> Self {
        Self {
            team_a,
            team_b,
            overs_limit,
            batting_first: default_batting_first(),
            super_over: SuperOverConfig::default(),
        }
    }

    pub fn with_batting_first(mut self, side: Side) -> Self {
        self.batting_first = side;
        self
    }

    /// Parse and validate a TOML match file.
    pub fn from_toml_str(source: &str) -> ScoringResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| ScoringError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ScoringResult<String> {
        toml::to_string_pretty(self).map_err(|e| ScoringError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ScoringResult<()> {
        if self.overs_limit == 0 {
            return Err(ScoringError::Config("overs_limit must be positive".into()));
        }
        if self.overs_limit > MAX_OVERS_LIMIT {
            return Err(ScoringError::Config(format!(
                "overs_limit {} exceeds {MAX_OVERS_LIMIT}",
                self.overs_limit
            )));
        }
        if self.super_over.overs == 0 || self.super_over.max_wickets == 0 {
            return Err(ScoringError::Config(
                "super over needs at least one over and one wicket".into(),
            ));
        }
        if self.super_over.overs > self.overs_limit {
            return Err(ScoringError::Config(
                "a super over cannot be longer than the main innings".into(),
            ));
        }
        for team in [&self.team_a, &self.team_b] {
            if team.name.trim().is_empty() {
                return Err(ScoringError::Config("team name must not be empty".into()));
            }
        }
        let home: HashSet<&PlayerId> = self.team_a.playing_xi.players().iter().collect();
        if let Some(shared) = self
            .team_b
            .playing_xi
            .players()
            .iter()
            .find(|p| home.contains(p))
        {
            return Err(ScoringError::Config(format!(
                "player {shared} is named in both elevens"
            )));
        }
        Ok(())
    }

    pub fn team(&self, side: Side) -> &TeamConfig {
        match side {
            Side::TeamA => &self.team_a,
            Side::TeamB => &self.team_b,
        }
    }

    pub fn team_name(&self, side: Side) -> &str {
        &self.team(side).name
    }

    /// The side a player was named for, if any.
    pub fn side_of(&self, player: &PlayerId) -> Option<Side> {
        [Side::TeamA, Side::TeamB]
            .into_iter()
            .find(|side| self.team(*side).playing_xi.contains(player))
    }
}

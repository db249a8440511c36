//! Scripted matches: a match config plus the operator actions to replay.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use crick_engine::{
    ExtraSelection, Hooks, MatchConfig, MatchScorer, RoleField, ScoringInput, WicketInput,
};
use crick_ledger::InMemoryBallLedger;
use crick_types::{InningsSlot, MatchId, PlayerId};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub config: Option<MatchConfig>,
    pub actions: Vec<Action>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Assign {
        field: RoleField,
        player: PlayerId,
    },
    Ball {
        /// Innings label (`teamA`, `teamB_super`, ...); defaults to the active innings.
        #[serde(default)]
        slot: Option<String>,
        #[serde(default)]
        runs: u32,
        #[serde(default)]
        extra: ExtraSelection,
        #[serde(default)]
        boundary: Option<bool>,
        #[serde(default)]
        wicket: Option<WicketInput>,
    },
    Undo,
    SecondInnings,
    SuperOver,
    Finalize {
        player_of_match: PlayerId,
    },
    Abandon,
}

impl Script {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing script {}", path.display()))
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<MatchConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    MatchConfig::from_toml_str(&raw).with_context(|| format!("loading config {}", path.display()))
}

/// Run every action against a fresh in-memory match. Stops at the first
/// rejected action.
pub fn run(
    script: &Script,
    config_override: Option<MatchConfig>,
) -> anyhow::Result<MatchScorer<InMemoryBallLedger>> {
    let config = match (config_override, &script.config) {
        (Some(config), _) => config,
        (None, Some(config)) => config.clone(),
        (None, None) => bail!("no match config: pass --config or embed one in the script"),
    };
    let mut scorer =
        MatchScorer::new(MatchId::new(), config, InMemoryBallLedger::new(), Hooks::default())?;

    for (index, action) in script.actions.iter().enumerate() {
        apply(&mut scorer, action)
            .with_context(|| format!("action #{} ({})", index + 1, describe(action)))?;
    }
    debug!(
        match_id = %scorer.match_id(),
        actions = script.actions.len(),
        phase = %scorer.state().phase,
        "script replayed"
    );
    Ok(scorer)
}

fn apply(scorer: &mut MatchScorer<InMemoryBallLedger>, action: &Action) -> anyhow::Result<()> {
    match action {
        Action::Assign { field, player } => scorer.assign_role(*field, player.clone())?,
        Action::Ball {
            slot,
            runs,
            extra,
            boundary,
            wicket,
        } => {
            let slot = match slot {
                Some(label) => label.parse::<InningsSlot>()?,
                None => scorer.state().current,
            };
            let input = ScoringInput {
                runs: *runs,
                extra: *extra,
                boundary: *boundary,
                wicket: wicket.clone(),
            };
            scorer.submit(slot, &input)?;
        }
        Action::Undo => {
            scorer.undo()?;
        }
        Action::SecondInnings => scorer.start_second_innings()?,
        Action::SuperOver => scorer.start_super_over()?,
        Action::Finalize { player_of_match } => scorer.finalize(player_of_match.clone())?,
        Action::Abandon => scorer.abandon()?,
    }
    Ok(())
}

fn describe(action: &Action) -> &'static str {
    match action {
        Action::Assign { .. } => "assign",
        Action::Ball { .. } => "ball",
        Action::Undo => "undo",
        Action::SecondInnings => "second_innings",
        Action::SuperOver => "super_over",
        Action::Finalize { .. } => "finalize",
        Action::Abandon => "abandon",
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crick_engine::MatchPhase;

    use super::*;

    const SCRIPT: &str = r#"{
  "config": {
    "team_a": { "name": "Lions", "playing_xi": ["a1", "a2", "a3"] },
    "team_b": { "name": "Tigers", "playing_xi": ["b1", "b2", "b3"] },
    "overs_limit": 1
  },
  "actions": [
    { "action": "assign", "field": "Striker", "player": "a1" },
    { "action": "assign", "field": "NonStriker", "player": "a2" },
    { "action": "assign", "field": "Bowler", "player": "b1" },
    { "action": "ball", "runs": 4 },
    { "action": "ball", "runs": 1, "extra": "Wide" },
    { "action": "ball", "wicket": { "kind": "Bowled", "dismissed": "Striker" } },
    { "action": "assign", "field": "Striker", "player": "a3" },
    { "action": "ball", "runs": 2 },
    { "action": "ball", "runs": 2 },
    { "action": "undo" },
    { "action": "ball", "runs": 1 },
    { "action": "ball", "slot": "teamA" },
    { "action": "ball" }
  ]
}"#;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn replays_a_script_from_disk() {
        let file = write_temp(SCRIPT);
        let script = Script::load(file.path()).unwrap();
        let scorer = run(&script, None).unwrap();
        assert_eq!(scorer.state().phase, MatchPhase::InningsBreak);
        let stats = scorer.current_innings().unwrap();
        assert_eq!(stats.total_runs, 4 + 2 + 2 + 1);
        assert_eq!(stats.total_wickets, 1);
        assert_eq!(stats.legal_balls, 6);
        assert_eq!(scorer.state().target, Some(10));
    }

    #[test]
    fn rejected_action_names_its_position() {
        let mut script: Script = serde_json::from_str(SCRIPT).unwrap();
        script.actions.truncate(3);
        script.actions.push(Action::SuperOver);
        let err = run(&script, None).err().unwrap();
        assert!(format!("{err:#}").contains("action #4 (super_over)"));
    }

    #[test]
    fn missing_config_is_an_error() {
        let script = Script {
            config: None,
            actions: Vec::new(),
        };
        assert!(run(&script, None).is_err());
    }

    #[test]
    fn config_file_overrides_script() {
        let toml = r#"
overs_limit = 5
[team_a]
name = "North"
playing_xi = ["a1", "a2", "a3"]
[team_b]
name = "South"
playing_xi = ["b1", "b2", "b3"]
"#;
        let file = write_temp(toml);
        let config = load_config(file.path()).unwrap();
        let script: Script = serde_json::from_str(SCRIPT).unwrap();
        let scorer = run(&script, Some(config)).unwrap();
        assert_eq!(scorer.config().team_a.name, "North");
        assert_eq!(scorer.state().phase, MatchPhase::FirstInnings);
    }
}

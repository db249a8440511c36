//! Plain-text scorecard rendering.

use std::fmt::Write;

use colored::Colorize;
use crick_engine::{MatchConfig, MatchSnapshot};
use crick_ledger::InningsStats;
use crick_types::{Extras, InningsSlot, Stage};

pub fn render(snapshot: &MatchSnapshot, config: &MatchConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} v {}  {}",
        config.team_a.name.bold(),
        config.team_b.name.bold(),
        format!("[{}]", snapshot.state.phase).dimmed()
    );
    for stats in &snapshot.innings {
        out.push('\n');
        out.push_str(&render_innings(stats, config));
    }
    out.push('\n');
    out.push_str(&result_line(snapshot));
    out.push('\n');
    out
}

pub fn result_line(snapshot: &MatchSnapshot) -> String {
    let mut line = if snapshot.result.is_decided() {
        snapshot.result.summary.green().bold().to_string()
    } else {
        snapshot.result.summary.yellow().to_string()
    };
    if let Some(player) = &snapshot.state.player_of_match {
        let _ = write!(line, "  (player of the match: {player})");
    }
    line
}

fn innings_title(slot: InningsSlot, config: &MatchConfig) -> String {
    let team = config.team_name(slot.side);
    match slot.stage {
        Stage::Main => team.to_string(),
        Stage::SuperOver(1) => format!("{team} (Super Over)"),
        Stage::SuperOver(n) => format!("{team} (Super Over {n})"),
    }
}

pub fn render_innings(stats: &InningsStats, config: &MatchConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  {}/{} ({} ov)",
        innings_title(stats.slot, config).bold().underline(),
        stats.total_runs,
        stats.total_wickets,
        stats.overs()
    );
    if let Some(target) = stats.target {
        let _ = writeln!(
            out,
            "  target {target}, need {} off {} balls",
            target.saturating_sub(stats.total_runs),
            stats.remaining_balls
        );
    }

    let _ = writeln!(
        out,
        "  {:<16}{:>5}{:>5}{:>5}{:>5}{:>8}  {}",
        "Batter".cyan(),
        "R",
        "B",
        "4s",
        "6s",
        "SR",
        "How out"
    );
    for batter in &stats.batsman_stats {
        let how_out = batter.dismissal.as_deref().unwrap_or("not out");
        let _ = writeln!(
            out,
            "  {:<16}{:>5}{:>5}{:>5}{:>5}{:>8.2}  {}",
            batter.player.as_str(),
            batter.runs,
            batter.balls,
            batter.fours,
            batter.sixes,
            batter.strike_rate,
            how_out
        );
    }
    let _ = writeln!(out, "  {}", extras_line(&stats.extras));

    if !stats.fall_of_wickets.is_empty() {
        let falls: Vec<String> = stats
            .fall_of_wickets
            .iter()
            .map(|f| {
                format!(
                    "{}-{} ({}, {})",
                    f.wicket_number, f.score_at_fall, f.batsman, f.over_at_fall
                )
            })
            .collect();
        let _ = writeln!(out, "  {} {}", "Fall of wickets:".cyan(), falls.join(", "));
    }

    let _ = writeln!(
        out,
        "  {:<16}{:>6}{:>4}{:>5}{:>4}{:>8}",
        "Bowler".cyan(),
        "O",
        "M",
        "R",
        "W",
        "Econ"
    );
    for bowler in &stats.bowler_stats {
        let _ = writeln!(
            out,
            "  {:<16}{:>6}{:>4}{:>5}{:>4}{:>8.2}",
            bowler.player.as_str(),
            bowler.overs,
            bowler.maidens,
            bowler.runs_conceded,
            bowler.wickets,
            bowler.economy
        );
    }

    if !stats.recent_overs.is_empty() {
        let _ = writeln!(out, "  {}", "Recent overs:".cyan());
        for over in &stats.recent_overs {
            let _ = writeln!(
                out,
                "    {:>3}  {:<10} {}  ({})",
                over.number,
                over.bowler.as_str(),
                over.badges.join(" "),
                over.runs
            );
        }
    }
    out
}

pub fn extras_line(extras: &Extras) -> String {
    format!(
        "Extras {} (w {}, nb {}, b {}, lb {}, p {})",
        extras.total(),
        extras.wides,
        extras.no_balls,
        extras.byes,
        extras.leg_byes,
        extras.penalty
    )
}

#[cfg(test)]
mod tests {
    use crick_engine::{Hooks, MatchScorer, RoleField, ScoringInput, TeamConfig};
    use crick_ledger::InMemoryBallLedger;
    use crick_types::{MatchId, PlayerId, PlayingXi};

    use super::*;

    fn config() -> MatchConfig {
        let xi = |p: &str| {
            PlayingXi::new((1..=3).map(|i| PlayerId::new(format!("{p}{i}"))).collect()).unwrap()
        };
        MatchConfig::new(
            TeamConfig {
                name: "Lions".into(),
                playing_xi: xi("a"),
            },
            TeamConfig {
                name: "Tigers".into(),
                playing_xi: xi("b"),
            },
            2,
        )
    }

    fn scorer() -> MatchScorer<InMemoryBallLedger> {
        let mut scorer =
            MatchScorer::new(MatchId::new(), config(), InMemoryBallLedger::new(), Hooks::default())
                .unwrap();
        scorer.assign_role(RoleField::Striker, PlayerId::new("a1")).unwrap();
        scorer.assign_role(RoleField::NonStriker, PlayerId::new("a2")).unwrap();
        scorer.assign_role(RoleField::Bowler, PlayerId::new("b1")).unwrap();
        let slot = scorer.state().current;
        scorer.submit(slot, &ScoringInput::runs(4)).unwrap();
        scorer.submit(slot, &ScoringInput::wide(0)).unwrap();
        scorer.submit(slot, &ScoringInput::leg_byes(1)).unwrap();
        scorer
    }

    #[test]
    fn extras_breakdown() {
        let extras = Extras {
            wides: 3,
            no_balls: 1,
            byes: 2,
            leg_byes: 1,
            penalty: 0,
        };
        assert_eq!(extras_line(&extras), "Extras 7 (w 3, nb 1, b 2, lb 1, p 0)");
    }

    #[test]
    fn scorecard_lists_batting_and_bowling() {
        colored::control::set_override(false);
        let scorer = scorer();
        let card = render(&scorer.snapshot(), scorer.config());
        assert!(card.starts_with("Lions v Tigers  [first innings]"), "{card}");
        assert!(card.contains("Lions  6/0 (0.2 ov)"), "{card}");
        assert!(card.contains("a1"));
        assert!(card.contains("not out"));
        assert!(card.contains("Extras 2 (w 1, nb 0, b 0, lb 1, p 0)"));
        assert!(card.contains("b1"));
    }

    #[test]
    fn super_over_titles() {
        let config = config();
        assert_eq!(
            innings_title("teamB_super".parse().unwrap(), &config),
            "Tigers (Super Over)"
        );
        assert_eq!(
            innings_title("teamA_super2".parse().unwrap(), &config),
            "Lions (Super Over 2)"
        );
    }
}

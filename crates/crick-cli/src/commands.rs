use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use crick_engine::MatchConfig;
use crick_ledger::{StreamValidator, ValidationReport};
use serde::Serialize;

use crate::cli::*;
use crate::scorecard;
use crate::script::{self, Script};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Replay(args) => cmd_replay(args, &cli.format),
        Command::Validate(args) => cmd_validate(args, &cli.format),
        Command::Check(args) => cmd_check(args, &cli.format),
    }
}

fn load(script: &Path, config: Option<&Path>) -> anyhow::Result<(Script, Option<MatchConfig>)> {
    let loaded = Script::load(script)?;
    let config = config.map(script::load_config).transpose()?;
    Ok((loaded, config))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_replay(args: ReplayArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let (loaded, config) = load(&args.script, args.config.as_deref())?;
    let scorer = script::run(&loaded, config)?;
    let snapshot = scorer.snapshot();
    match format {
        OutputFormat::Json if args.summary => print_json(&snapshot.result),
        OutputFormat::Json => print_json(&snapshot),
        OutputFormat::Text if args.summary => {
            println!("{}", scorecard::result_line(&snapshot));
            Ok(())
        }
        OutputFormat::Text => {
            print!("{}", scorecard::render(&snapshot, scorer.config()));
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct SlotReport {
    slot: String,
    deliveries: u64,
    valid: bool,
    violations: Vec<String>,
}

impl From<&ValidationReport> for SlotReport {
    fn from(report: &ValidationReport) -> Self {
        Self {
            slot: report.slot.label(),
            deliveries: report.delivery_count,
            valid: report.is_valid(),
            violations: report
                .violations
                .iter()
                .map(|v| format!("seq {}: {:?}: {}", v.seq, v.kind, v.description))
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct ValidateReport {
    innings: Vec<SlotReport>,
    snapshots_converge: bool,
}

fn cmd_validate(args: ValidateArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let (loaded, config) = load(&args.script, args.config.as_deref())?;
    let scorer = script::run(&loaded, config)?;
    let reports = StreamValidator::validate_all(scorer.ledger()).context("validating ledger")?;
    let report = ValidateReport {
        innings: reports.iter().map(SlotReport::from).collect(),
        snapshots_converge: scorer.verify()?,
    };
    let ok = report.snapshots_converge && report.innings.iter().all(|r| r.valid);

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            for slot in &report.innings {
                let mark = if slot.valid { "✓".green() } else { "✗".red() };
                println!("{mark} {} ({} deliveries)", slot.slot.bold(), slot.deliveries);
                for violation in &slot.violations {
                    println!("    {}", violation.red());
                }
            }
            if report.snapshots_converge {
                println!("{} Snapshots match full replay.", "✓".green());
            } else {
                println!("{} Snapshots diverge from replay.", "✗".red());
            }
        }
    }
    if !ok {
        anyhow::bail!("ledger validation failed");
    }
    Ok(())
}

fn cmd_check(args: CheckArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = script::load_config(&args.config)?;
    match format {
        OutputFormat::Json => print_json(&config),
        OutputFormat::Text => {
            println!(
                "{} {} v {}, {} overs, {} bat first",
                "✓".green().bold(),
                config.team_a.name.bold(),
                config.team_b.name.bold(),
                config.overs_limit,
                config.team_name(config.batting_first).yellow()
            );
            println!(
                "  super over: {} over(s), {} wicket(s)",
                config.super_over.overs, config.super_over.max_wickets
            );
            Ok(())
        }
    }
}

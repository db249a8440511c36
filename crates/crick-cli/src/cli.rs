use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "crick",
    about = "crick: ball-by-ball cricket scoring from the command line",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay a scripted match and print the scorecard
    Replay(ReplayArgs),
    /// Replay a scripted match and verify its ball ledger
    Validate(ValidateArgs),
    /// Check a match configuration file
    Check(CheckArgs),
}

#[derive(Args)]
pub struct ReplayArgs {
    /// Match script (JSON)
    pub script: PathBuf,
    /// Match configuration (TOML); overrides the script's own config
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Only print the result line
    #[arg(long)]
    pub summary: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    pub script: PathBuf,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Match configuration (TOML)
    pub config: PathBuf,
}

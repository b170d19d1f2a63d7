//! Command line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Call volume, duration and sentiment reports from recorded calls.
#[derive(Parser, Debug)]
#[command(name = "callmetrics", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (YAML or TOML)
    #[arg(short, long, global = true, env = "CALLMETRICS_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Log level, overriding the configuration
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute a report for one owner and print it as JSON
    Report(ReportArgs),
    /// Generate a synthetic record set
    Seed(SeedArgs),
}

/// Arguments of `callmetrics report`.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// JSON file holding an array of call records; defaults to `storage.records_path`
    #[arg(short, long)]
    pub records: Option<PathBuf>,

    /// Owner to report on
    #[arg(short, long)]
    pub owner: String,

    /// First day, YYYY-MM-DD or RFC 3339
    #[arg(long)]
    pub start: Option<String>,

    /// Last day, YYYY-MM-DD or RFC 3339
    #[arg(long)]
    pub end: Option<String>,

    /// Evaluate as if it were this instant (RFC 3339)
    #[arg(long)]
    pub now: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments of `callmetrics seed`.
#[derive(Args, Debug, Clone)]
pub struct SeedArgs {
    /// Owner of the generated records
    #[arg(short, long)]
    pub owner: String,

    /// Number of records
    #[arg(long, default_value_t = 100)]
    pub count: usize,

    /// Spread records over this many days before now
    #[arg(long, default_value_t = 30)]
    pub days: u32,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write the records here instead of standard output
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Evaluate as if it were this instant (RFC 3339)
    #[arg(long)]
    pub now: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_report() {
        let cli = Cli::try_parse_from([
            "callmetrics",
            "--log-level",
            "debug",
            "report",
            "--records",
            "calls.json",
            "--owner",
            "alice",
            "--start",
            "2024-01-01",
            "--pretty",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Report(args) => {
                assert_eq!(args.owner, "alice");
                assert_eq!(args.start.as_deref(), Some("2024-01-01"));
                assert!(args.end.is_none());
                assert!(args.pretty);
            }
            Command::Seed(_) => panic!("expected report"),
        }
    }

    #[test]
    fn test_seed_defaults() {
        let cli = Cli::try_parse_from(["callmetrics", "seed", "--owner", "bob"]).unwrap();

        match cli.command {
            Command::Seed(args) => {
                assert_eq!(args.count, 100);
                assert_eq!(args.days, 30);
                assert_eq!(args.seed, 42);
            }
            Command::Report(_) => panic!("expected seed"),
        }
    }

    #[test]
    fn test_owner_is_required() {
        assert!(Cli::try_parse_from(["callmetrics", "report"]).is_err());
    }
}

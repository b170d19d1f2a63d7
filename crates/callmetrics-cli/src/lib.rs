//! # Call Metrics CLI
//!
//! Library half of the `callmetrics` binary: argument definitions, the
//! subcommand implementations and the front end's error type.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod cli;
pub mod error;

pub use app::{run_report, run_seed};
pub use cli::{Cli, Command, ReportArgs, SeedArgs};
pub use error::{CliError, CliResult};

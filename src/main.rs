//! ui-validation - declarative browser UI validation
//!
//! Runs a JSON validation file against one or more browsers and prints a
//! report summary. Exits with status 1 when any report fails.

use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use ui_validation::commands::Commands;
use ui_validation::common::logging;
use ui_validation::registry::Registry;
use ui_validation::cli;

#[derive(Parser)]
#[command(name = "ui-validation", about = "Declarative browser UI validation")]
#[command(version, long_about = None)]
struct Cli {
    /// More log output; repeat for more detail
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Write logs to the default log file
    #[arg(long, global = true, conflicts_with = "log_file")]
    log: bool,

    /// Configuration file; defaults to the per-user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let registry = Registry::builtin();

    let matches = registry.extend_cli(Cli::command()).get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let log_file = cli
        .log_file
        .or_else(|| cli.log.then(logging::default_log_path).flatten());
    let guard = logging::init_cli(cli.verbose, log_file.as_deref());

    let invocation = cli::Invocation {
        registry,
        config: cli.config,
        matches: &matches,
    };

    let code = match cli::dispatch(cli.command, invocation).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            2
        }
    };

    // Flush the log file before exiting
    drop(guard);
    std::process::exit(code);
}

//! CLI command definitions

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a validation file against its target browsers
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Target browser; repeat for several. Overrides the file's targetBrowsers
        #[arg(long = "browser", short = 'b')]
        browsers: Vec<String>,

        /// Fixture file merged into the data store; repeat for several, later files win
        #[arg(long = "definitions", short = 'd')]
        definitions: Vec<PathBuf>,

        /// Show the browser and let errors abort instead of becoming reports
        #[arg(long)]
        debug: bool,

        /// Show the browser window
        #[arg(long)]
        headed: bool,

        /// Pass --no-sandbox to Chromium based browsers
        #[arg(long)]
        no_sandbox: bool,

        /// Pretty-print the report summary
        #[arg(long, short = 'P')]
        pretty: bool,

        /// Write the report summary to this file as well as stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Use the in-memory scripted browser instead of WebDriver
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that a validation file parses and every name resolves
    Check {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Filter and print a saved report summary
    Summary {
        /// Report summary JSON file
        report: PathBuf,

        /// Only reports for this browser
        #[arg(long, short = 'b')]
        browser: Option<String>,

        /// Only validations of this type
        #[arg(long = "type", short = 't')]
        validation_type: Option<String>,

        /// Only validations checking this state
        #[arg(long, short = 's')]
        state: Option<String>,

        /// Only failed reports
        #[arg(long, conflicts_with = "passed")]
        failed: bool,

        /// Only passed reports
        #[arg(long)]
        passed: bool,

        /// Only critical failures
        #[arg(long)]
        critical: bool,

        /// Print the filtered summary as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Where the validation file comes from
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Path to a validation file, or the file's JSON itself with --json
    pub input: String,

    /// Treat INPUT as JSON text instead of a path
    #[arg(long, short = 'j')]
    pub json: bool,
}

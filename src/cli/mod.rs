//! CLI command handling
//!
//! Turns parsed commands into engine calls and formats their results.
//! Returns the process exit code.

mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::browser::scripted::{ScriptedBrowserFactory, ScriptedSite};
use crate::browser::webdriver::WebDriverFactory;
use crate::browser::SessionFactory;
use crate::commands::{Commands, InputArgs};
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::context::{Context, RunFlag, RunOptions};
use crate::orchestrator::UiValidation;
use crate::registry::{BrowserTarget, Registry};
use crate::reports::{Encode, Filter, ReportSummary};
use crate::runner::Plan;
use crate::validation_file::ValidationFile;

/// Key of the captured outputs in `run`'s printed result
pub const OUTPUTS_KEY: &str = "Outputs";

/// Everything `dispatch` needs besides the command itself
pub struct Invocation<'a> {
    pub registry: Arc<Registry>,
    /// Explicit `--config` path
    pub config: Option<PathBuf>,
    /// Full parse result, handed to plugin configure hooks
    pub matches: &'a clap::ArgMatches,
}

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, invocation: Invocation<'_>) -> Result<i32> {
    match command {
        Commands::Run {
            input,
            browsers,
            definitions,
            debug,
            headed,
            no_sandbox,
            pretty,
            output: summary_path,
            dry_run,
        } => {
            let config = load_config(invocation.config.as_deref())?;
            let file = read_input(&input)?;
            let Config {
                defaults,
                timeouts,
                webdriver,
                definitions: config_definitions,
            } = config;

            let mut options = RunOptions {
                headless: defaults.headless,
                no_sandbox: defaults.no_sandbox,
                pretty: defaults.pretty,
                ..RunOptions::default()
            };
            if no_sandbox {
                options.set(RunFlag::NoSandbox, true);
            }
            if pretty {
                options.set(RunFlag::Pretty, true);
            }
            if headed {
                options.set(RunFlag::Headless, false);
            }
            if debug {
                options.set(RunFlag::Debug, true);
                options.set(RunFlag::Headless, false);
                options.set(RunFlag::SuppressExceptions, false);
            }

            let registry = invocation.registry;
            let mut ctx =
                Context::create(Arc::clone(&registry), options).with_timeouts(timeouts.clone());
            registry.configure(&mut ctx, invocation.matches);
            for path in config_definitions.iter().chain(definitions.iter()) {
                ctx.load_definition_file(path)?;
            }

            let browsers = if !browsers.is_empty() {
                browsers
            } else if !file.target_browsers.is_empty() {
                file.target_browsers.clone()
            } else {
                defaults.browsers
            };

            let factory: Arc<dyn SessionFactory> = if dry_run {
                tracing::info!("Dry run: using the scripted browser");
                Arc::new(ScriptedBrowserFactory::new(ScriptedSite::new()))
            } else {
                Arc::new(WebDriverFactory::new(webdriver, &timeouts)?)
            };

            let summary = UiValidation::new(file, factory)
                .with_browsers(browsers)
                .validate_all(&mut ctx)
                .await?;

            let result = run_result(&summary, ctx.outputs())?;
            let text = if ctx.options().pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{text}");
            if let Some(path) = summary_path {
                std::fs::write(&path, format!("{text}\n"))?;
                tracing::info!(path = %path.display(), "Report summary written");
            }
            output::print_summary(&summary);

            Ok(if summary.has_failures() { 1 } else { 0 })
        }

        Commands::Check { input } => {
            let file = read_input(&input)?;
            check(&invocation.registry, &file)
        }

        Commands::Summary {
            report,
            browser,
            validation_type,
            state,
            failed,
            passed,
            critical,
            json,
        } => {
            let content =
                std::fs::read_to_string(&report).map_err(|e| Error::file_read(&report, e))?;
            let summary = ReportSummary::from_json(&content)?;

            let mut filters = Vec::new();
            if let Some(browser) = browser {
                filters.push(Filter::Browser(browser));
            }
            if let Some(validation_type) = validation_type {
                filters.push(Filter::Type(validation_type));
            }
            if let Some(state) = state {
                filters.push(Filter::State(state));
            }
            if failed {
                filters.push(Filter::Success(false));
            }
            if passed {
                filters.push(Filter::Success(true));
            }
            if critical {
                filters.push(Filter::CriticalFailure);
            }
            let filtered = summary.filter_by(Filter::All(filters));

            if json {
                println!("{}", filtered.to_json_pretty()?);
            } else {
                output::print_summary(&filtered);
            }
            Ok(0)
        }
    }
}

/// The summary, plus the captured outputs under `Outputs` when there are any
fn run_result(summary: &ReportSummary, outputs: &Map<String, Value>) -> Result<Value> {
    let mut result = summary.to_value()?;
    if let (Some(object), false) = (result.as_object_mut(), outputs.is_empty()) {
        object.insert(OUTPUTS_KEY.to_string(), Value::Object(outputs.clone()));
    }
    Ok(result)
}

/// Explicit config paths must exist; the default one is optional
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) if !path.exists() => Err(Error::Config(format!(
            "config file '{}' does not exist",
            path.display()
        ))),
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn read_input(input: &InputArgs) -> Result<ValidationFile> {
    if input.json {
        ValidationFile::from_json(&input.input)
    } else {
        ValidationFile::from_path(Path::new(&input.input))
    }
}

/// Resolve every name in the file without starting a browser
fn check(registry: &Registry, file: &ValidationFile) -> Result<i32> {
    let mut ok = true;

    if file.target_browsers.is_empty() {
        output::print_check_line(true, "targetBrowsers", "none listed, pass --browser when running");
    }
    for name in &file.target_browsers {
        match registry.resolve::<BrowserTarget>(name) {
            Ok(target) => output::print_check_line(true, "browser", target.to_string().as_str()),
            Err(e) => {
                ok = false;
                output::print_check_line(false, "browser", &e.to_string());
            }
        }
    }

    match Plan::build(registry, file) {
        Ok(plan) => output::print_check_line(
            true,
            "plan",
            &format!(
                "{} steps, {} validations",
                plan.steps.len(),
                plan.validations.len()
            ),
        ),
        Err(e) => {
            ok = false;
            output::print_check_line(
                false,
                &format!("#{} {}", e.index, e.action),
                &e.error.to_string(),
            );
        }
    }

    Ok(if ok { 0 } else { 1 })
}

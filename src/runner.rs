//! Per-browser execution
//!
//! Setup steps run first and stop at the first one that fails. Validations
//! then run independently, one report each. An error with suppression on
//! becomes a failure report where it happened; with suppression off it
//! aborts the pass and is handed back as [`RunAborted`].

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;

use crate::common::{Error, Result};
use crate::context::Context;
use crate::registry::{BrowserTarget, Registry, Vocabulary};
use crate::reports::{Report, StepFailureReport, ValidationReport};
use crate::steps::{ActionEnv, Outcome, Step};
use crate::validation_file::ValidationFile;
use crate::validations::Validation;

/// Action recorded when a validation aborts a pass
pub const VALIDATE_ACTION: &str = "Validate";

/// Everything a browser pass will run, with names resolved
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub steps: Vec<Step>,
    pub validations: Vec<Validation>,
}

/// A definition whose names could not be resolved
#[derive(Debug)]
pub struct PlanError {
    /// Position in the combined list of steps followed by validations
    pub index: usize,
    /// The step's action name, or [`VALIDATE_ACTION`]
    pub action: String,
    pub error: Error,
}

impl Plan {
    pub fn build(registry: &Registry, file: &ValidationFile) -> std::result::Result<Plan, PlanError> {
        let steps = file
            .steps
            .iter()
            .enumerate()
            .map(|(index, def)| {
                Step::from_def(registry, index, def).map_err(|error| PlanError {
                    index,
                    action: def.action.clone(),
                    error,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let offset = steps.len();
        let validations = file
            .validations
            .iter()
            .enumerate()
            .map(|(j, def)| {
                Validation::from_def(registry, offset + j, def).map_err(|error| PlanError {
                    index: offset + j,
                    action: VALIDATE_ACTION.to_string(),
                    error,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Plan { steps, validations })
    }

    pub fn len(&self) -> usize {
        self.steps.len() + self.validations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A pass stopped by an error that was not suppressed
#[derive(Debug)]
pub struct RunAborted {
    /// Reports produced before the error
    pub reports: Vec<Report>,
    pub index: usize,
    pub action: String,
    pub error: Error,
}

impl RunAborted {
    pub fn new(index: usize, action: impl Into<String>, error: Error) -> Self {
        Self {
            reports: Vec::new(),
            index,
            action: action.into(),
            error,
        }
    }

    /// The reports so far plus a failure report for the error itself
    pub fn into_reports(self, browser: &str) -> Vec<Report> {
        let mut reports = self.reports;
        reports.push(
            StepFailureReport::new(browser, self.index, self.action, self.error.to_string()).into(),
        );
        reports
    }
}

impl From<PlanError> for RunAborted {
    fn from(e: PlanError) -> Self {
        RunAborted::new(e.index, e.action, e.error)
    }
}

/// Text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run a handler future, turning a panic into [`Error::HandlerPanicked`]
async fn guarded<F>(name: &str, future: F) -> Result<Outcome>
where
    F: Future<Output = Result<Outcome>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(Error::HandlerPanicked(format!(
            "{name}: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

/// Runs a plan against the session bound to a context
pub struct Runner<'a> {
    ctx: &'a mut Context,
    browser: BrowserTarget,
    reports: Vec<Report>,
}

impl<'a> Runner<'a> {
    pub fn new(ctx: &'a mut Context, browser: BrowserTarget) -> Self {
        Self {
            ctx,
            browser,
            reports: Vec::new(),
        }
    }

    async fn execute_step(&mut self, step: &Step) -> Result<Outcome> {
        let resolved = step.resolve(self.ctx)?;
        tracing::debug!(index = step.index, action = %step.action, "Step resolved");

        let handler = self.ctx.registry().step_handler(&step.action)?;
        let timeouts = self.ctx.timeouts().clone();
        let mut env = ActionEnv {
            session: self.ctx.driver_mut()?,
            timeouts: &timeouts,
        };
        let outcome = guarded(step.action.name(), handler.perform(&resolved, &mut env)).await?;

        if let Outcome::Completed(value) = &outcome {
            match (value, &resolved.output_name) {
                (Some(value), Some(name)) => self.ctx.create_output(name, value.clone())?,
                (None, Some(name)) => {
                    tracing::debug!(index = step.index, output = %name, "Step produced no value to capture")
                }
                _ => {}
            }
        }
        Ok(outcome)
    }

    async fn execute_validation(&mut self, validation: &Validation) -> Result<Outcome> {
        let handler = self
            .ctx
            .registry()
            .validation_handler(&validation.validation_type)?;
        if !handler.supports(&validation.state) {
            return Err(Error::unsupported_state(
                validation.validation_type.name(),
                validation.state.name(),
            ));
        }

        let resolved = validation.resolve(self.ctx)?;
        let timeouts = self.ctx.timeouts().clone();
        let mut env = ActionEnv {
            session: self.ctx.driver_mut()?,
            timeouts: &timeouts,
        };
        guarded(
            validation.validation_type.name(),
            handler.validate(&resolved, &mut env),
        )
        .await
    }

    /// Run every step, then every validation
    pub async fn run(mut self, plan: &Plan) -> std::result::Result<Vec<Report>, RunAborted> {
        let suppress = self.ctx.options().suppress_exceptions;
        let browser = self.browser.name().to_string();

        for step in &plan.steps {
            let action = step.action.name().to_string();
            let failure = match self.execute_step(step).await {
                Ok(Outcome::Completed(_)) => {
                    tracing::debug!(browser = %browser, index = step.index, action = %action, "Step completed");
                    continue;
                }
                Ok(Outcome::Failed(msg)) => msg,
                Err(error) if suppress => {
                    tracing::warn!(browser = %browser, index = step.index, action = %action, code = error.code(), "Step errored: {}", error);
                    error.to_string()
                }
                Err(error) => {
                    return Err(RunAborted {
                        reports: self.reports,
                        index: step.index,
                        action,
                        error,
                    })
                }
            };

            tracing::info!(browser = %browser, index = step.index, action = %action, "Step failed, skipping the rest of this browser's run");
            self.reports
                .push(StepFailureReport::new(&browser, step.index, action, failure).into());
            return Ok(self.reports);
        }

        for validation in &plan.validations {
            let (success, msg) = match self.execute_validation(validation).await {
                Ok(Outcome::Completed(_)) => (true, None),
                Ok(Outcome::Failed(msg)) => (false, Some(msg)),
                Err(error) if suppress => {
                    tracing::warn!(browser = %browser, index = validation.index, code = error.code(), "Validation errored: {}", error);
                    (false, Some(error.to_string()))
                }
                Err(error) => {
                    return Err(RunAborted {
                        reports: self.reports,
                        index: validation.index,
                        action: VALIDATE_ACTION.to_string(),
                        error,
                    })
                }
            };

            tracing::debug!(
                browser = %browser,
                validation = %validation.validation_type,
                state = %validation.state,
                target = %validation.target,
                success,
                "Validation checked"
            );
            self.reports.push(
                ValidationReport::new(
                    &browser,
                    validation.validation_type.name(),
                    &validation.target,
                    validation.state.name(),
                    success,
                    msg,
                )
                .into(),
            );
        }

        Ok(self.reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file(value: serde_json::Value) -> ValidationFile {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_plan_indexes_validations_after_steps() {
        let plan = Plan::build(
            &Registry::builtin(),
            &file(json!({
                "steps": [{"type": "Refresh"}, {"type": "NavigateBack"}],
                "validations": [{"type": "URL", "state": "Equals", "value": "x"}]
            })),
        )
        .unwrap();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.validations[0].index, 2);
    }

    #[test]
    fn test_plan_reports_first_unresolvable_name() {
        let err = Plan::build(
            &Registry::builtin(),
            &file(json!({
                "steps": [{"type": "Refresh"}],
                "validations": [
                    {"type": "XPath", "target": "//a", "state": "Exists"},
                    {"type": "Screenshot", "target": "//a", "state": "Exists"}
                ]
            })),
        )
        .unwrap_err();
        assert_eq!(err.index, 2);
        assert_eq!(err.action, VALIDATE_ACTION);
        assert!(matches!(err.error, Error::UnknownName { .. }));
    }

    #[test]
    fn test_aborted_run_ends_with_failure_report() {
        let reports = RunAborted::new(4, "Click", Error::NoDriver).into_reports("Edge");
        let failure = reports[0].as_step_failure().unwrap();
        assert_eq!(failure.index(), 4);
        assert_eq!(failure.action(), "Click");
        assert_eq!(failure.browser(), "Edge");
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}

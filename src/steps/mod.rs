//! Setup steps
//!
//! A [`Step`] is a step definition whose names have been resolved against the
//! registry. Right before it runs, its locator and parameters are resolved
//! against the context into a [`ResolvedStep`], which is what a
//! [`StepHandler`] sees.

pub mod actions;
pub mod outputs;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::browser::{BrowserSession, Locator};
use crate::common::config::Timeouts;
use crate::common::{Error, Result};
use crate::context::expression::value_to_string;
use crate::context::Context;
use crate::registry::{ActionType, OutputSource, Registry, Vocabulary};
use crate::validation_file::StepDef;

/// Result of a handler that ran to completion
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Done, optionally producing a value for `outputName`
    Completed(Option<Value>),
    /// Ran, but the desired state was not reached
    Failed(String),
}

impl Outcome {
    pub fn done() -> Self {
        Outcome::Completed(None)
    }

    pub fn value(value: Value) -> Self {
        Outcome::Completed(Some(value))
    }

    /// Completed when `success`, otherwise failed with `msg`
    pub fn check(success: bool, msg: impl FnOnce() -> String) -> Self {
        if success {
            Outcome::done()
        } else {
            Outcome::Failed(msg())
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }
}

/// What a handler may touch while it runs
pub struct ActionEnv<'a> {
    pub session: &'a mut dyn BrowserSession,
    pub timeouts: &'a Timeouts,
}

/// Performs one kind of action
#[async_trait]
pub trait StepHandler: Send + Sync {
    async fn perform(&self, step: &ResolvedStep, env: &mut ActionEnv<'_>) -> Result<Outcome>;
}

/// Built-in handler for an action; `None` for extension actions
pub fn builtin_handler(action: &ActionType) -> Option<Arc<dyn StepHandler>> {
    match action {
        ActionType::Extension(_) => None,
        ActionType::OutputValue => Some(Arc::new(outputs::OutputValue)),
        ActionType::WaitForExistence | ActionType::WaitForVisibility => {
            Some(Arc::new(actions::WaitFor))
        }
        _ => Some(Arc::new(actions::BrowserAction)),
    }
}

/// A step with its names resolved
#[derive(Debug, Clone)]
pub struct Step {
    pub index: usize,
    pub action: ActionType,
    pub locator: Option<Locator>,
    pub parameters: Map<String, Value>,
    pub output_name: Option<String>,
    /// Source for `OutputValue` steps
    pub output_source: Option<OutputSource>,
}

impl Step {
    pub fn from_def(registry: &Registry, index: usize, def: &StepDef) -> Result<Self> {
        let action: ActionType = registry.resolve(&def.action)?;
        let output_source = match def.parameters.get("source") {
            Some(Value::String(source)) if action == ActionType::OutputValue => {
                Some(registry.resolve::<OutputSource>(source)?)
            }
            _ => None,
        };
        Ok(Self {
            index,
            action,
            locator: def.locator.clone(),
            parameters: def.parameters.clone(),
            output_name: def.output_name.clone(),
            output_source,
        })
    }

    /// Resolve the locator and every parameter against the context as it is now
    pub fn resolve(&self, ctx: &Context) -> Result<ResolvedStep> {
        let locator = match &self.locator {
            Some(locator) => Some(locator.with_selector(ctx.resolve_string(&locator.selector)?)),
            None => None,
        };
        Ok(ResolvedStep {
            action: self.action.clone(),
            locator,
            parameters: ctx.resolve_params(&self.parameters)?,
            output_name: self.output_name.clone(),
            output_source: self.output_source.clone(),
        })
    }
}

/// A step ready to run: no expressions left
#[derive(Debug, Clone)]
pub struct ResolvedStep {
    pub action: ActionType,
    pub locator: Option<Locator>,
    pub parameters: Map<String, Value>,
    pub output_name: Option<String>,
    pub output_source: Option<OutputSource>,
}

impl ResolvedStep {
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name).filter(|value| !value.is_null())
    }

    pub fn require(&self, name: &str) -> Result<&Value> {
        self.param(name).ok_or_else(|| {
            Error::invalid_step(self.action.name(), format!("missing parameter '{name}'"))
        })
    }

    pub fn require_str(&self, name: &str) -> Result<String> {
        self.require(name).map(value_to_string)
    }

    /// An unsigned number, given as a JSON number or a numeric string
    pub fn require_u64(&self, name: &str) -> Result<u64> {
        let value = self.require(name)?;
        value
            .as_u64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .ok_or_else(|| {
                Error::invalid_step(
                    self.action.name(),
                    format!("parameter '{name}' must be a whole number, got {value}"),
                )
            })
    }

    pub fn require_locator(&self) -> Result<&Locator> {
        self.locator
            .as_ref()
            .ok_or_else(|| Error::invalid_step(self.action.name(), "no locator specified"))
    }
}

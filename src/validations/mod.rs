//! Validations
//!
//! Like steps, a [`Validation`] has its names resolved when the browser pass
//! is planned and its expressions resolved right before it runs.

pub mod compare;
pub mod url;
pub mod xpath;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::common::{Error, Result};
use crate::context::expression::value_to_string;
use crate::context::Context;
use crate::registry::{Registry, ValidationState, ValidationType};
use crate::steps::{ActionEnv, Outcome};
use crate::validation_file::ValidationDef;

/// Checks one kind of validation
#[async_trait]
pub trait ValidationHandler: Send + Sync {
    /// Whether this handler can check `state`
    fn supports(&self, state: &ValidationState) -> bool;

    /// `Completed` when the desired state holds, `Failed` with a message
    /// when it doesn't
    async fn validate(
        &self,
        validation: &ResolvedValidation,
        env: &mut ActionEnv<'_>,
    ) -> Result<Outcome>;
}

/// Built-in handler for a validation type; `None` for extension types
pub fn builtin_handler(validation_type: &ValidationType) -> Option<Arc<dyn ValidationHandler>> {
    match validation_type {
        ValidationType::XPath => Some(Arc::new(xpath::XPathValidation)),
        ValidationType::Url => Some(Arc::new(url::UrlValidation)),
        ValidationType::Extension(_) => None,
    }
}

/// A validation with its names resolved
#[derive(Debug, Clone)]
pub struct Validation {
    pub index: usize,
    pub validation_type: ValidationType,
    pub state: ValidationState,
    /// Target as written, used in reports
    pub target: String,
    pub value: Option<Value>,
    pub parameters: Map<String, Value>,
}

impl Validation {
    pub fn from_def(registry: &Registry, index: usize, def: &ValidationDef) -> Result<Self> {
        Ok(Self {
            index,
            validation_type: registry.resolve(&def.validation_type)?,
            state: registry.resolve(&def.state)?,
            target: def.target.clone(),
            value: def.value.clone(),
            parameters: def.parameters.clone(),
        })
    }

    pub fn resolve(&self, ctx: &Context) -> Result<ResolvedValidation> {
        let expected = match &self.value {
            Some(value) => Some(value_to_string(&ctx.resolve_value(value)?)),
            None => None,
        };
        Ok(ResolvedValidation {
            validation_type: self.validation_type.clone(),
            state: self.state.clone(),
            target: ctx.resolve_string(&self.target)?,
            expected,
            parameters: ctx.resolve_params(&self.parameters)?,
        })
    }
}

/// A validation ready to check
#[derive(Debug, Clone)]
pub struct ResolvedValidation {
    pub validation_type: ValidationType,
    pub state: ValidationState,
    pub target: String,
    pub expected: Option<String>,
    pub parameters: Map<String, Value>,
}

impl ResolvedValidation {
    fn missing(&self, what: &str) -> Error {
        Error::invalid_step(
            &format!("{} {}", self.validation_type, self.state),
            format!("missing {what}"),
        )
    }

    pub fn param_str(&self, name: &str) -> Option<String> {
        self.parameters
            .get(name)
            .filter(|value| !value.is_null())
            .map(value_to_string)
    }

    pub fn require_param(&self, name: &str) -> Result<String> {
        self.param_str(name)
            .ok_or_else(|| self.missing(&format!("parameter '{name}'")))
    }

    /// The expected value: `value`, falling back to `parameters.value`
    pub fn require_expected(&self) -> Result<String> {
        self.expected
            .clone()
            .or_else(|| self.param_str("value"))
            .ok_or_else(|| self.missing("expected value"))
    }

    /// The pattern for pattern states: `parameters.pattern`, falling back
    /// to the expected value
    pub fn require_pattern(&self) -> Result<String> {
        self.param_str("pattern")
            .or_else(|| self.expected.clone())
            .ok_or_else(|| self.missing("pattern"))
    }
}

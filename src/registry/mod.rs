//! Plugin registry
//!
//! Plugins register hooks on a [`RegistryBuilder`]; the frozen [`Registry`] is
//! shared by the whole run through an `Arc` and is never modified afterwards.
//! Built-in names always win over hooks. Among hooks, the one registered first
//! that gives an answer wins.

pub mod hooks;
pub mod vocabulary;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::common::{Error, Result};
use crate::context::expression::Segment;
use crate::context::{Context, RunOptions};
use crate::steps::{self, StepHandler};
use crate::validations::{self, ValidationHandler};

pub use hooks::{HookChain, ValidateEvent};
pub use vocabulary::{
    ActionType, BrowserTarget, Category, OutputSource, ValidationState, ValidationType, Vocabulary,
};

use hooks::{
    CliOptionsHook, ConfigureHook, ContextHook, ExpressionHook, NameHook, StepHandlerHook,
    ValidateHook, ValidationHandlerHook,
};

/// Every extension point, one chain each
#[derive(Default)]
pub struct Hooks {
    pub(crate) action_names: HookChain<NameHook<ActionType>>,
    pub(crate) validation_type_names: HookChain<NameHook<ValidationType>>,
    pub(crate) state_names: HookChain<NameHook<ValidationState>>,
    pub(crate) browser_names: HookChain<NameHook<BrowserTarget>>,
    pub(crate) output_source_names: HookChain<NameHook<OutputSource>>,
    step_handlers: HookChain<StepHandlerHook>,
    validation_handlers: HookChain<ValidationHandlerHook>,
    expression_roots: HookChain<ExpressionHook>,
    cli_options: HookChain<CliOptionsHook>,
    configure: HookChain<ConfigureHook>,
    context: HookChain<ContextHook>,
    pre_validate: HookChain<ValidateHook>,
    post_validate: HookChain<ValidateHook>,
}

/// A bundle of hooks registered under one name
pub trait Plugin {
    fn name(&self) -> &str;
    fn register(&self, registry: &mut RegistryBuilder);
}

/// Collects hooks before the run starts
#[derive(Default)]
pub struct RegistryBuilder {
    hooks: Hooks,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let a plugin register its hooks
    pub fn plugin(&mut self, plugin: &dyn Plugin) -> &mut Self {
        tracing::debug!(plugin = plugin.name(), "Registering plugin");
        plugin.register(self);
        self
    }

    /// Resolve names of category `T` that the built-in table doesn't know
    pub fn name_resolver<T: Vocabulary>(
        &mut self,
        plugin: &str,
        hook: impl Fn(&str) -> Option<T> + Send + Sync + 'static,
    ) -> &mut Self {
        T::resolvers_mut(&mut self.hooks).push(plugin, Box::new(hook));
        self
    }

    pub fn step_handler(
        &mut self,
        plugin: &str,
        hook: impl Fn(&ActionType) -> Option<Arc<dyn StepHandler>> + Send + Sync + 'static,
    ) -> &mut Self {
        self.hooks.step_handlers.push(plugin, Box::new(hook));
        self
    }

    pub fn validation_handler(
        &mut self,
        plugin: &str,
        hook: impl Fn(&ValidationType) -> Option<Arc<dyn ValidationHandler>> + Send + Sync + 'static,
    ) -> &mut Self {
        self.hooks.validation_handlers.push(plugin, Box::new(hook));
        self
    }

    pub fn expression_root(
        &mut self,
        plugin: &str,
        hook: impl Fn(&str, &[Segment]) -> Option<Value> + Send + Sync + 'static,
    ) -> &mut Self {
        self.hooks.expression_roots.push(plugin, Box::new(hook));
        self
    }

    pub fn cli_options(
        &mut self,
        plugin: &str,
        hook: impl Fn(clap::Command) -> clap::Command + Send + Sync + 'static,
    ) -> &mut Self {
        self.hooks.cli_options.push(plugin, Box::new(hook));
        self
    }

    pub fn configure(
        &mut self,
        plugin: &str,
        hook: impl Fn(&mut Context, &clap::ArgMatches) + Send + Sync + 'static,
    ) -> &mut Self {
        self.hooks.configure.push(plugin, Box::new(hook));
        self
    }

    pub fn context_factory(
        &mut self,
        plugin: &str,
        hook: impl Fn(&RunOptions) -> Option<Context> + Send + Sync + 'static,
    ) -> &mut Self {
        self.hooks.context.push(plugin, Box::new(hook));
        self
    }

    pub fn pre_validate(
        &mut self,
        plugin: &str,
        hook: impl Fn(&ValidateEvent<'_>) + Send + Sync + 'static,
    ) -> &mut Self {
        self.hooks.pre_validate.push(plugin, Box::new(hook));
        self
    }

    pub fn post_validate(
        &mut self,
        plugin: &str,
        hook: impl Fn(&ValidateEvent<'_>) + Send + Sync + 'static,
    ) -> &mut Self {
        self.hooks.post_validate.push(plugin, Box::new(hook));
        self
    }

    /// Freeze the registry
    pub fn build(self) -> Arc<Registry> {
        Arc::new(Registry { hooks: self.hooks })
    }
}

/// Frozen set of hooks, consulted throughout the run
pub struct Registry {
    hooks: Hooks,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name_resolvers", &self.name_resolver_count())
            .field("step_handlers", &self.hooks.step_handlers.len())
            .field("validation_handlers", &self.hooks.validation_handlers.len())
            .field("expression_roots", &self.hooks.expression_roots.len())
            .field("pre_validate", &self.hooks.pre_validate.len())
            .field("post_validate", &self.hooks.post_validate.len())
            .finish_non_exhaustive()
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry with no plugins
    pub fn builtin() -> Arc<Registry> {
        RegistryBuilder::new().build()
    }

    fn name_resolver_count(&self) -> usize {
        self.hooks.action_names.len()
            + self.hooks.validation_type_names.len()
            + self.hooks.state_names.len()
            + self.hooks.browser_names.len()
            + self.hooks.output_source_names.len()
    }

    /// Resolve a name to a vocabulary value: built-ins first, then hooks
    pub fn resolve<T: Vocabulary>(&self, name: &str) -> Result<T> {
        if let Some(value) = T::builtin(name) {
            return Ok(value);
        }
        match T::resolvers(&self.hooks).first(|hook| hook(name)) {
            Some((plugin, value)) => {
                tracing::trace!(plugin, name, category = %T::CATEGORY, "Name resolved by plugin");
                Ok(value)
            }
            None => Err(Error::unknown_name(T::CATEGORY, name)),
        }
    }

    /// Handler for an action: plugin hooks first, then the built-in factory
    pub fn step_handler(&self, action: &ActionType) -> Result<Arc<dyn StepHandler>> {
        if let Some((plugin, handler)) = self.hooks.step_handlers.first(|hook| hook(action)) {
            tracing::trace!(plugin, action = %action, "Step handler supplied by plugin");
            return Ok(handler);
        }
        steps::builtin_handler(action).ok_or_else(|| Error::NoHandler {
            category: Category::ActionType,
            name: action.name().to_string(),
        })
    }

    /// Handler for a validation type: plugin hooks first, then the built-in factory
    pub fn validation_handler(
        &self,
        validation_type: &ValidationType,
    ) -> Result<Arc<dyn ValidationHandler>> {
        if let Some((plugin, handler)) = self
            .hooks
            .validation_handlers
            .first(|hook| hook(validation_type))
        {
            tracing::trace!(plugin, validation = %validation_type, "Validation handler supplied by plugin");
            return Ok(handler);
        }
        validations::builtin_handler(validation_type).ok_or_else(|| Error::NoHandler {
            category: Category::ValidationType,
            name: validation_type.name().to_string(),
        })
    }

    /// Ask plugins for an expression root no built-in namespace has
    pub fn resolve_expression_root(&self, root: &str, rest: &[Segment]) -> Option<Value> {
        self.hooks
            .expression_roots
            .first(|hook| hook(root, rest))
            .map(|(_, value)| value)
    }

    /// Let every plugin add its command-line options
    pub fn extend_cli(&self, command: clap::Command) -> clap::Command {
        self.hooks
            .cli_options
            .iter()
            .fold(command, |command, entry| (entry.hook)(command))
    }

    /// Run every configure hook, in registration order
    pub fn configure(&self, context: &mut Context, matches: &clap::ArgMatches) {
        for entry in self.hooks.configure.iter() {
            tracing::debug!(plugin = %entry.plugin, "Running configure hook");
            (entry.hook)(context, matches);
        }
    }

    /// A replacement context from the first plugin that supplies one
    pub fn override_context(&self, options: &RunOptions) -> Option<Context> {
        self.hooks
            .context
            .first(|hook| hook(options))
            .map(|(plugin, context)| {
                tracing::debug!(plugin, "Context supplied by plugin");
                context
            })
    }

    pub fn pre_validate(&self, event: &ValidateEvent<'_>) {
        for entry in self.hooks.pre_validate.iter() {
            (entry.hook)(event);
        }
    }

    pub fn post_validate(&self, event: &ValidateEvent<'_>) {
        for entry in self.hooks.post_validate.iter() {
            (entry.hook)(event);
        }
    }
}

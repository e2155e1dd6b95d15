//! Hook signatures and ordered hook chains

use std::sync::Arc;

use serde_json::Value;

use crate::context::expression::Segment;
use crate::context::{Context, RunOptions};
use crate::reports::ReportSummary;
use crate::steps::StepHandler;
use crate::validation_file::ValidationFile;
use crate::validations::ValidationHandler;

use super::vocabulary::{ActionType, BrowserTarget, ValidationType};

/// Resolve a name the built-in table doesn't know
pub type NameHook<T> = dyn Fn(&str) -> Option<T> + Send + Sync;

/// Supply a handler for an action, consulted before the built-in factory
pub type StepHandlerHook = dyn Fn(&ActionType) -> Option<Arc<dyn StepHandler>> + Send + Sync;

/// Supply a handler for a validation type, consulted before the built-in factory
pub type ValidationHandlerHook =
    dyn Fn(&ValidationType) -> Option<Arc<dyn ValidationHandler>> + Send + Sync;

/// Resolve an expression whose root is in no built-in namespace.
/// Receives the root name and the remaining path segments.
pub type ExpressionHook = dyn Fn(&str, &[Segment]) -> Option<Value> + Send + Sync;

/// Add command-line options
pub type CliOptionsHook = dyn Fn(clap::Command) -> clap::Command + Send + Sync;

/// Adjust the context once options are parsed
pub type ConfigureHook = dyn Fn(&mut Context, &clap::ArgMatches) + Send + Sync;

/// Replace the default context
pub type ContextHook = dyn Fn(&RunOptions) -> Option<Context> + Send + Sync;

/// Observe a browser pass before it starts or after it is folded
pub type ValidateHook = dyn Fn(&ValidateEvent<'_>) + Send + Sync;

/// What a pre/post validate hook sees
pub struct ValidateEvent<'a> {
    pub browser: &'a BrowserTarget,
    pub file: &'a ValidationFile,
    pub context: &'a Context,
    /// Summary so far; includes this browser's group in post hooks
    pub summary: &'a ReportSummary,
}

/// One registered hook and the plugin that registered it
pub struct HookEntry<H: ?Sized> {
    pub plugin: String,
    pub hook: Box<H>,
}

/// Hooks for one extension point, in registration order
pub struct HookChain<H: ?Sized> {
    entries: Vec<HookEntry<H>>,
}

impl<H: ?Sized> Default for HookChain<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H: ?Sized> HookChain<H> {
    pub fn push(&mut self, plugin: impl Into<String>, hook: Box<H>) {
        self.entries.push(HookEntry {
            plugin: plugin.into(),
            hook,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HookEntry<H>> {
        self.entries.iter()
    }

    /// Call hooks in order until one gives a definitive answer.
    /// Later hooks are not invoked once an answer is found.
    pub fn first<R>(&self, mut call: impl FnMut(&H) -> Option<R>) -> Option<(&str, R)> {
        self.entries
            .iter()
            .find_map(|entry| call(&entry.hook).map(|answer| (entry.plugin.as_str(), answer)))
    }
}

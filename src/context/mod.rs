//! Run context
//!
//! Holds what every step of a run shares: the definitions data store, the
//! outputs captured by earlier steps, the run options, timeouts, the plugin
//! registry and the slot for the browser session of the current pass.

pub mod expression;

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::browser::BrowserSession;
use crate::common::config::Timeouts;
use crate::common::{Error, Result};
use crate::registry::Registry;

use expression::Resolver;

/// Boolean run options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    pub debug: bool,
    pub headless: bool,
    pub no_sandbox: bool,
    pub pretty: bool,
    pub suppress_exceptions: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            debug: false,
            headless: true,
            no_sandbox: false,
            pretty: false,
            suppress_exceptions: true,
        }
    }
}

/// Names for the individual run options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunFlag {
    Debug,
    Headless,
    NoSandbox,
    Pretty,
    SuppressExceptions,
}

impl RunOptions {
    /// Debug mode: visible browser, errors propagate instead of becoming reports
    pub fn debug_mode() -> Self {
        Self {
            debug: true,
            headless: false,
            suppress_exceptions: false,
            ..Self::default()
        }
    }

    /// Toggle one flag; the others are left as they are
    pub fn set(&mut self, flag: RunFlag, on: bool) {
        match flag {
            RunFlag::Debug => self.debug = on,
            RunFlag::Headless => self.headless = on,
            RunFlag::NoSandbox => self.no_sandbox = on,
            RunFlag::Pretty => self.pretty = on,
            RunFlag::SuppressExceptions => self.suppress_exceptions = on,
        }
    }

    pub fn is_set(&self, flag: RunFlag) -> bool {
        match flag {
            RunFlag::Debug => self.debug,
            RunFlag::Headless => self.headless,
            RunFlag::NoSandbox => self.no_sandbox,
            RunFlag::Pretty => self.pretty,
            RunFlag::SuppressExceptions => self.suppress_exceptions,
        }
    }
}

/// Merge `overlay` into `base`; objects merge recursively, anything else
/// in `overlay` replaces what `base` had
pub fn deep_merge(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, incoming) in overlay {
        match (base.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => deep_merge(existing, incoming),
            _ => {
                base.insert(key.clone(), incoming.clone());
            }
        }
    }
}

/// Shared state for a run
pub struct Context {
    data: Map<String, Value>,
    outputs: Map<String, Value>,
    options: RunOptions,
    timeouts: Timeouts,
    registry: Arc<Registry>,
    driver: Option<Box<dyn BrowserSession>>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("data", &self.data)
            .field("outputs", &self.outputs)
            .field("options", &self.options)
            .field("timeouts", &self.timeouts)
            .field("driver", &self.driver.as_ref().map(|d| d.target().to_string()))
            .finish()
    }
}

impl Context {
    /// Plain context, ignoring any context hooks
    pub fn new(registry: Arc<Registry>, options: RunOptions) -> Self {
        Self {
            data: Map::new(),
            outputs: Map::new(),
            options,
            timeouts: Timeouts::default(),
            registry,
            driver: None,
        }
    }

    /// Context from the first plugin that supplies one, otherwise [`Context::new`].
    /// A supplied context is rebound to `registry`.
    pub fn create(registry: Arc<Registry>, options: RunOptions) -> Self {
        match registry.override_context(&options) {
            Some(mut context) => {
                context.registry = registry;
                context
            }
            None => Self::new(registry, options),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut RunOptions {
        &mut self.options
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn outputs(&self) -> &Map<String, Value> {
        &self.outputs
    }

    /// Merge definitions over the data store; incoming values win
    pub fn load_definitions(&mut self, definitions: &Map<String, Value>) {
        deep_merge(&mut self.data, definitions);
    }

    /// Merge definitions under the data store; values already loaded win
    pub fn load_base_definitions(&mut self, definitions: &Map<String, Value>) {
        let mut merged = definitions.clone();
        deep_merge(&mut merged, &self.data);
        self.data = merged;
    }

    /// Merge a JSON fixture file over the data store
    pub fn load_definition_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        let definitions: Map<String, Value> = serde_json::from_str(&content)
            .map_err(|e| Error::Parse(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), keys = definitions.len(), "Loaded definitions");
        self.load_definitions(&definitions);
        Ok(())
    }

    /// Store a captured value. Dotted names create nested namespaces;
    /// a name that runs through an existing non-object value is rejected.
    pub fn create_output(&mut self, name: &str, value: Value) -> Result<()> {
        let invalid = || Error::InvalidOutputName(name.to_string());
        let (namespace, leaf) = match name.rsplit_once('.') {
            Some((namespace, leaf)) => (Some(namespace), leaf),
            None => (None, name),
        };
        if leaf.is_empty() {
            return Err(invalid());
        }

        let mut store = &mut self.outputs;
        if let Some(namespace) = namespace {
            for part in namespace.split('.') {
                if part.is_empty() {
                    return Err(invalid());
                }
                store = match store
                    .entry(part.to_string())
                    .or_insert_with(|| Value::Object(Map::new()))
                {
                    Value::Object(inner) => inner,
                    _ => return Err(invalid()),
                };
            }
        }

        tracing::debug!(output = name, "Captured output");
        store.insert(leaf.to_string(), value);
        Ok(())
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver {
            data: &self.data,
            outputs: &self.outputs,
            registry: &self.registry,
        }
    }

    /// Resolve a string that may be an expression
    pub fn resolve(&self, text: &str) -> Result<Value> {
        self.resolver().resolve(text)
    }

    /// Resolve a string and render the result as text
    pub fn resolve_string(&self, text: &str) -> Result<String> {
        self.resolve(text).map(|value| expression::value_to_string(&value))
    }

    /// Resolve every string in a JSON value
    pub fn resolve_value(&self, value: &Value) -> Result<Value> {
        self.resolver().resolve_value(value)
    }

    /// Resolve every string in a parameter map
    pub fn resolve_params(&self, params: &Map<String, Value>) -> Result<Map<String, Value>> {
        self.resolver().resolve_map(params)
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    /// Bind a session for the current pass. A context holds at most one;
    /// if one is bound already the new session is handed back.
    pub fn attach_driver(
        &mut self,
        session: Box<dyn BrowserSession>,
    ) -> std::result::Result<(), Box<dyn BrowserSession>> {
        if self.driver.is_some() {
            return Err(session);
        }
        self.driver = Some(session);
        Ok(())
    }

    /// The bound session
    pub fn driver_mut(&mut self) -> Result<&mut (dyn BrowserSession + 'static)> {
        self.driver.as_deref_mut().ok_or(Error::NoDriver)
    }

    /// Unbind the session so it can be released
    pub fn detach_driver(&mut self) -> Option<Box<dyn BrowserSession>> {
        self.driver.take()
    }
}

//! Scripted in-memory browser
//!
//! Serves a fixed set of pages, each a flat list of elements matched by exact
//! selector regardless of strategy. Every call is appended to a journal
//! shared with the factory, so callers can inspect what a run did after its
//! sessions are gone. Faults can be injected per operation to simulate
//! driver errors and handler panics.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::{BrowserSession, Cookie, ElementHandle, Locator, SessionFactory};
use crate::common::{Error, Result};
use crate::context::RunOptions;
use crate::registry::{BrowserTarget, Vocabulary};

/// An element on a scripted page
#[derive(Debug, Clone)]
pub struct ScriptedElement {
    selector: String,
    text: String,
    visible: bool,
    attributes: HashMap<String, String>,
    properties: HashMap<String, Value>,
    appears_after: usize,
}

impl ScriptedElement {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            text: String::new(),
            visible: true,
            attributes: HashMap::new(),
            properties: HashMap::new(),
            appears_after: 0,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Only match after this many element lookups in the session
    pub fn appears_after(mut self, lookups: usize) -> Self {
        self.appears_after = lookups;
        self
    }
}

/// Pages keyed by URL, plus redirects applied on navigation
#[derive(Debug, Clone, Default)]
pub struct ScriptedSite {
    pages: HashMap<String, Vec<ScriptedElement>>,
    redirects: HashMap<String, String>,
}

impl ScriptedSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, elements: Vec<ScriptedElement>) -> Self {
        self.pages.insert(url.into(), elements);
        self
    }

    pub fn redirect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.redirects.insert(from.into(), to.into());
        self
    }
}

/// What an injected fault does
#[derive(Debug, Clone)]
pub enum Fault {
    Error(String),
    Panic(String),
}

#[derive(Debug, Clone)]
struct FaultRule {
    browser: Option<String>,
    operation: String,
    fault: Fault,
}

type Journal = Arc<Mutex<Vec<String>>>;

fn append(journal: &Journal, entry: String) {
    journal
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .push(entry);
}

/// Opens [`ScriptedSession`]s over a shared site
#[derive(Debug, Clone)]
pub struct ScriptedBrowserFactory {
    site: Arc<ScriptedSite>,
    journal: Journal,
    failing_starts: HashSet<String>,
    faults: Arc<Vec<FaultRule>>,
}

impl ScriptedBrowserFactory {
    pub fn new(site: ScriptedSite) -> Self {
        Self {
            site: Arc::new(site),
            journal: Arc::default(),
            failing_starts: HashSet::new(),
            faults: Arc::default(),
        }
    }

    /// Refuse to start sessions for this browser
    pub fn fail_start(mut self, browser: &str) -> Self {
        self.failing_starts.insert(browser.to_lowercase());
        self
    }

    /// Inject a fault into an operation for every browser
    pub fn fault(self, operation: &str, fault: Fault) -> Self {
        self.add_fault(None, operation, fault)
    }

    /// Inject a fault into an operation for one browser
    pub fn fault_for(self, browser: &str, operation: &str, fault: Fault) -> Self {
        self.add_fault(Some(browser.to_lowercase()), operation, fault)
    }

    fn add_fault(mut self, browser: Option<String>, operation: &str, fault: Fault) -> Self {
        let mut faults = self.faults.as_ref().clone();
        faults.push(FaultRule {
            browser,
            operation: operation.to_string(),
            fault,
        });
        self.faults = Arc::new(faults);
        self
    }

    /// Every call made so far, as `"<browser> <operation> <detail>"`
    pub fn journal(&self) -> Vec<String> {
        self.journal
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of journal entries for one browser and operation
    pub fn count(&self, browser: &str, operation: &str) -> usize {
        let prefix = format!("{browser} {operation}");
        self.journal()
            .iter()
            .filter(|entry| *entry == &prefix || entry.starts_with(&format!("{prefix} ")))
            .count()
    }
}

#[async_trait]
impl SessionFactory for ScriptedBrowserFactory {
    async fn start(
        &self,
        target: &BrowserTarget,
        options: &RunOptions,
    ) -> Result<Box<dyn BrowserSession>> {
        if self.failing_starts.contains(&target.name().to_lowercase()) {
            append(&self.journal, format!("{target} start-failed"));
            return Err(Error::session_start(target.name(), "scripted start failure"));
        }
        append(
            &self.journal,
            format!("{target} start headless={}", options.headless),
        );
        Ok(Box::new(ScriptedSession {
            target: target.clone(),
            site: Arc::clone(&self.site),
            journal: Arc::clone(&self.journal),
            faults: Arc::clone(&self.faults),
            history: Vec::new(),
            position: 0,
            lookups: 0,
            cookies: Vec::new(),
            values: HashMap::new(),
            attributes: HashMap::new(),
        }))
    }
}

/// Session over a [`ScriptedSite`]
pub struct ScriptedSession {
    target: BrowserTarget,
    site: Arc<ScriptedSite>,
    journal: Journal,
    faults: Arc<Vec<FaultRule>>,
    history: Vec<String>,
    position: usize,
    lookups: usize,
    cookies: Vec<Cookie>,
    values: HashMap<String, String>,
    attributes: HashMap<(String, String), String>,
}

impl ScriptedSession {
    fn record(&self, operation: &str, detail: &str) -> Result<()> {
        let entry = if detail.is_empty() {
            format!("{} {operation}", self.target)
        } else {
            format!("{} {operation} {detail}", self.target)
        };
        append(&self.journal, entry);

        let browser = self.target.name().to_lowercase();
        let rule = self.faults.iter().find(|rule| {
            rule.operation == operation && rule.browser.as_ref().map_or(true, |b| *b == browser)
        });
        match rule.map(|rule| &rule.fault) {
            Some(Fault::Error(message)) => Err(Error::Session(message.clone())),
            Some(Fault::Panic(message)) => panic!("{message}"),
            None => Ok(()),
        }
    }

    fn current(&self) -> Option<&str> {
        self.history.get(self.position).map(String::as_str)
    }

    fn page(&self) -> &[ScriptedElement] {
        self.current()
            .and_then(|url| self.site.pages.get(url))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn element(&self, handle: &ElementHandle) -> Result<&ScriptedElement> {
        handle
            .id()
            .parse::<usize>()
            .ok()
            .and_then(|index| self.page().get(index))
            .ok_or_else(|| Error::Session(format!("stale element reference '{}'", handle.id())))
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    fn target(&self) -> &BrowserTarget {
        &self.target
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.record("navigate", url)?;
        let landed = self.site.redirects.get(url).cloned().unwrap_or_else(|| url.to_string());
        if !self.history.is_empty() {
            self.history.truncate(self.position + 1);
        }
        self.history.push(landed);
        self.position = self.history.len() - 1;
        self.values.clear();
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        self.record("current_url", "")?;
        Ok(self.current().unwrap_or("about:blank").to_string())
    }

    async fn back(&mut self) -> Result<()> {
        self.record("back", "")?;
        self.position = self.position.saturating_sub(1);
        Ok(())
    }

    async fn forward(&mut self) -> Result<()> {
        self.record("forward", "")?;
        if self.position + 1 < self.history.len() {
            self.position += 1;
        }
        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        self.record("refresh", "")?;
        self.values.clear();
        Ok(())
    }

    async fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>> {
        self.record("find", &locator.selector)?;
        self.lookups += 1;
        let lookups = self.lookups;
        Ok(self
            .page()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.selector == locator.selector && lookups > e.appears_after)
            .map(|(index, _)| ElementHandle::new(index.to_string()))
            .collect())
    }

    async fn text(&mut self, element: &ElementHandle) -> Result<String> {
        self.record("text", element.id())?;
        Ok(self.element(element)?.text.clone())
    }

    async fn is_displayed(&mut self, element: &ElementHandle) -> Result<bool> {
        self.record("displayed", element.id())?;
        Ok(self.element(element)?.visible)
    }

    async fn attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        self.record("attribute", name)?;
        let key = (element.id().to_string(), name.to_string());
        if let Some(value) = self.attributes.get(&key) {
            return Ok(Some(value.clone()));
        }
        Ok(self.element(element)?.attributes.get(name).cloned())
    }

    async fn property(&mut self, element: &ElementHandle, name: &str) -> Result<Option<Value>> {
        self.record("property", name)?;
        if name == "value" {
            if let Some(typed) = self.values.get(element.id()) {
                return Ok(Some(Value::String(typed.clone())));
            }
        }
        Ok(self
            .element(element)?
            .properties
            .get(name)
            .filter(|value| !value.is_null())
            .cloned())
    }

    async fn set_attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
        value: &str,
    ) -> Result<()> {
        self.record("set_attribute", &format!("{name}={value}"))?;
        self.element(element)?;
        self.attributes
            .insert((element.id().to_string(), name.to_string()), value.to_string());
        Ok(())
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<()> {
        self.record("click", element.id())?;
        self.element(element).map(|_| ())
    }

    async fn hover(&mut self, element: &ElementHandle) -> Result<()> {
        self.record("hover", element.id())?;
        self.element(element).map(|_| ())
    }

    async fn clear(&mut self, element: &ElementHandle) -> Result<()> {
        self.record("clear", element.id())?;
        self.element(element)?;
        self.values.insert(element.id().to_string(), String::new());
        Ok(())
    }

    async fn send_keys(&mut self, element: &ElementHandle, text: &str) -> Result<()> {
        self.record("send_keys", text)?;
        self.element(element)?;
        self.values
            .entry(element.id().to_string())
            .or_default()
            .push_str(text);
        Ok(())
    }

    async fn add_cookie(&mut self, cookie: &Cookie) -> Result<()> {
        self.record("add_cookie", &cookie.name)?;
        self.cookies.retain(|c| c.name != cookie.name);
        self.cookies.push(cookie.clone());
        Ok(())
    }

    async fn cookies(&mut self) -> Result<Vec<Cookie>> {
        self.record("cookies", "")?;
        Ok(self.cookies.clone())
    }

    async fn delete_cookie(&mut self, name: &str) -> Result<()> {
        self.record("delete_cookie", name)?;
        self.cookies.retain(|c| c.name != name);
        Ok(())
    }

    async fn delete_all_cookies(&mut self) -> Result<()> {
        self.record("delete_all_cookies", "")?;
        self.cookies.clear();
        Ok(())
    }

    async fn set_window_size(&mut self, width: u64, height: u64) -> Result<()> {
        self.record("set_window_size", &format!("{width}x{height}"))
    }

    async fn quit(&mut self) -> Result<()> {
        self.record("quit", "")
    }
}

//! Browser sessions
//!
//! Handlers drive the browser only through [`BrowserSession`]. Sessions come
//! from a [`SessionFactory`]: [`webdriver::WebDriverFactory`] talks to a W3C
//! WebDriver endpoint, [`scripted::ScriptedBrowserFactory`] serves an
//! in-memory page model for dry runs and tests.

pub mod scripted;
pub mod webdriver;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::Result;
use crate::context::RunOptions;
use crate::registry::BrowserTarget;

/// How a locator's selector is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocatorStrategy {
    #[default]
    #[serde(alias = "xpath", alias = "XPATH")]
    XPath,
    #[serde(alias = "css", alias = "CSS", alias = "CssSelector")]
    Css,
    #[serde(alias = "id", alias = "ID")]
    Id,
    #[serde(alias = "name", alias = "NAME")]
    Name,
    #[serde(alias = "tagName", alias = "tag", alias = "TAG_NAME")]
    TagName,
    #[serde(alias = "linkText", alias = "LINK_TEXT")]
    LinkText,
}

/// Element locator. In a validation file a bare string is an XPath.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LocatorRepr")]
pub struct Locator {
    pub selector: String,
    pub strategy: LocatorStrategy,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LocatorRepr {
    Bare(String),
    Full(LocatorFields),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LocatorFields {
    selector: String,
    #[serde(default)]
    strategy: LocatorStrategy,
}

impl From<LocatorRepr> for Locator {
    fn from(repr: LocatorRepr) -> Self {
        match repr {
            LocatorRepr::Bare(selector) => Locator::xpath(selector),
            LocatorRepr::Full(fields) => Locator {
                selector: fields.selector,
                strategy: fields.strategy,
            },
        }
    }
}

impl Locator {
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            strategy: LocatorStrategy::XPath,
        }
    }

    /// Same strategy, different selector
    pub fn with_selector(&self, selector: String) -> Self {
        Self {
            selector,
            strategy: self.strategy,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} '{}'", self.strategy, self.selector)
    }
}

/// Opaque reference to an element in the current page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// A browser cookie, in WebDriver's JSON shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<u64>,
}

/// An open browser session
#[async_trait]
pub trait BrowserSession: Send {
    /// Browser this session drives
    fn target(&self) -> &BrowserTarget;

    async fn navigate(&mut self, url: &str) -> Result<()>;
    async fn current_url(&mut self) -> Result<String>;
    async fn back(&mut self) -> Result<()>;
    async fn forward(&mut self) -> Result<()>;
    async fn refresh(&mut self) -> Result<()>;

    /// All elements matching the locator; empty when none match
    async fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>>;
    async fn text(&mut self, element: &ElementHandle) -> Result<String>;
    async fn is_displayed(&mut self, element: &ElementHandle) -> Result<bool>;
    async fn attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>>;
    async fn property(&mut self, element: &ElementHandle, name: &str) -> Result<Option<Value>>;
    async fn set_attribute(&mut self, element: &ElementHandle, name: &str, value: &str)
        -> Result<()>;

    async fn click(&mut self, element: &ElementHandle) -> Result<()>;
    async fn hover(&mut self, element: &ElementHandle) -> Result<()>;
    async fn clear(&mut self, element: &ElementHandle) -> Result<()>;
    async fn send_keys(&mut self, element: &ElementHandle, text: &str) -> Result<()>;

    async fn add_cookie(&mut self, cookie: &Cookie) -> Result<()>;
    async fn cookies(&mut self) -> Result<Vec<Cookie>>;
    async fn delete_cookie(&mut self, name: &str) -> Result<()>;
    async fn delete_all_cookies(&mut self) -> Result<()>;

    async fn set_window_size(&mut self, width: u64, height: u64) -> Result<()>;

    /// End the session. Called exactly once per session.
    async fn quit(&mut self) -> Result<()>;
}

/// Opens sessions for a browser target
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn start(
        &self,
        target: &BrowserTarget,
        options: &RunOptions,
    ) -> Result<Box<dyn BrowserSession>>;
}

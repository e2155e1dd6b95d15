//! W3C WebDriver client
//!
//! Each session is a base URL (`<endpoint>/session/<id>`) plus an HTTP client.
//! Commands are JSON over HTTP; a response whose `value` carries an `error`
//! field is a protocol error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use super::{BrowserSession, Cookie, ElementHandle, Locator, LocatorStrategy, SessionFactory};
use crate::common::config::{Timeouts, WebDriverConfig};
use crate::common::{Error, Result};
use crate::context::RunOptions;
use crate::registry::{BrowserTarget, Vocabulary};

/// Key under which W3C WebDriver returns element references
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const USER_AGENT: &str = "ui-validation";

/// Capabilities for a new session
fn capabilities(target: &BrowserTarget, options: &RunOptions) -> Value {
    let mut chromium_args = Vec::new();
    if options.headless {
        chromium_args.push("--headless=new");
    }
    if options.no_sandbox {
        chromium_args.push("--no-sandbox");
    }

    let always_match = match target {
        BrowserTarget::Firefox => {
            let args: Vec<&str> = if options.headless { vec!["-headless"] } else { vec![] };
            json!({"browserName": "firefox", "moz:firefoxOptions": {"args": args}})
        }
        BrowserTarget::Chrome => {
            json!({"browserName": "chrome", "goog:chromeOptions": {"args": chromium_args}})
        }
        BrowserTarget::Edge => {
            json!({"browserName": "MicrosoftEdge", "ms:edgeOptions": {"args": chromium_args}})
        }
        BrowserTarget::Extension(name) => json!({"browserName": name.to_lowercase()}),
    };

    json!({"capabilities": {"alwaysMatch": always_match}})
}

/// Translate a locator into WebDriver's `using`/`value` pair
fn locator_strategy(locator: &Locator) -> (&'static str, String) {
    let selector = &locator.selector;
    match locator.strategy {
        LocatorStrategy::XPath => ("xpath", selector.clone()),
        LocatorStrategy::Css => ("css selector", selector.clone()),
        LocatorStrategy::Id => ("css selector", format!("[id=\"{selector}\"]")),
        LocatorStrategy::Name => ("css selector", format!("[name=\"{selector}\"]")),
        LocatorStrategy::TagName => ("tag name", selector.clone()),
        LocatorStrategy::LinkText => ("link text", selector.clone()),
    }
}

/// Protocol error carried in a response body, if any
fn protocol_error(payload: &Value) -> Option<Error> {
    let value = payload.get("value")?;
    let error = value.get("error")?.as_str()?;
    let message = value.get("message").and_then(Value::as_str).unwrap_or("");
    Some(match error {
        "no such element" => Error::ElementNotFound(message.to_string()),
        _ => Error::Session(format!("{error}: {message}")),
    })
}

fn element_reference(element: &ElementHandle) -> Value {
    json!({ ELEMENT_KEY: element.id() })
}

/// Opens sessions against configured WebDriver endpoints
pub struct WebDriverFactory {
    client: reqwest::Client,
    endpoints: WebDriverConfig,
}

impl WebDriverFactory {
    pub fn new(endpoints: WebDriverConfig, timeouts: &Timeouts) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeouts.session_start().max(Duration::from_secs(1)))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, endpoints })
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    async fn start(
        &self,
        target: &BrowserTarget,
        options: &RunOptions,
    ) -> Result<Box<dyn BrowserSession>> {
        let endpoint = self
            .endpoints
            .endpoint_for(target.name())
            .trim_end_matches('/')
            .to_string();
        tracing::info!(browser = %target, endpoint = %endpoint, headless = options.headless, "Starting WebDriver session");

        let response = self
            .client
            .post(format!("{endpoint}/session"))
            .json(&capabilities(target, options))
            .send()
            .await
            .map_err(|e| Error::session_start(target.name(), format!("{endpoint}: {e}")))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| Error::session_start(target.name(), format!("invalid response: {e}")))?;

        if let Some(error) = protocol_error(&payload) {
            return Err(Error::session_start(target.name(), error.to_string()));
        }
        if !status.is_success() {
            return Err(Error::session_start(
                target.name(),
                format!("WebDriver returned status {status}"),
            ));
        }

        let session_id = payload
            .pointer("/value/sessionId")
            .or_else(|| payload.get("sessionId"))
            .and_then(Value::as_str)
            .ok_or_else(|| Error::session_start(target.name(), "response has no session id"))?;

        tracing::debug!(browser = %target, session = session_id, "WebDriver session started");
        Ok(Box::new(WebDriverSession {
            client: self.client.clone(),
            base: format!("{endpoint}/session/{session_id}"),
            target: target.clone(),
        }))
    }
}

/// A live WebDriver session
pub struct WebDriverSession {
    client: reqwest::Client,
    base: String,
    target: BrowserTarget,
}

impl WebDriverSession {
    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{path}", self.base);
        tracing::trace!(method = %method, url = %url, "WebDriver command");

        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(&body);
        } else if method == Method::POST {
            request = request.json(&json!({}));
        }

        let response = request.send().await?;
        let status = response.status();
        let payload: Value = response.json().await?;

        if let Some(error) = protocol_error(&payload) {
            return Err(error);
        }
        if !status.is_success() {
            return Err(Error::Session(format!("{method} {path} returned status {status}")));
        }
        Ok(payload.get("value").cloned().unwrap_or(Value::Null))
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.command(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.command(Method::POST, path, Some(body)).await
    }

    async fn element_get(&self, element: &ElementHandle, suffix: &str) -> Result<Value> {
        self.get(&format!("/element/{}/{suffix}", element.id())).await
    }

    async fn element_post(&self, element: &ElementHandle, suffix: &str, body: Value) -> Result<()> {
        self.post(&format!("/element/{}/{suffix}", element.id()), body)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    fn target(&self) -> &BrowserTarget {
        &self.target
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.post("/url", json!({ "url": url })).await.map(|_| ())
    }

    async fn current_url(&mut self) -> Result<String> {
        let value = self.get("/url").await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Session(format!("unexpected URL value {value}")))
    }

    async fn back(&mut self) -> Result<()> {
        self.post("/back", json!({})).await.map(|_| ())
    }

    async fn forward(&mut self) -> Result<()> {
        self.post("/forward", json!({})).await.map(|_| ())
    }

    async fn refresh(&mut self) -> Result<()> {
        self.post("/refresh", json!({})).await.map(|_| ())
    }

    async fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>> {
        let (using, value) = locator_strategy(locator);
        let found = self
            .post("/elements", json!({ "using": using, "value": value }))
            .await?;
        Ok(found
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get(ELEMENT_KEY).and_then(Value::as_str))
                    .map(ElementHandle::new)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn text(&mut self, element: &ElementHandle) -> Result<String> {
        let value = self.element_get(element, "text").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn is_displayed(&mut self, element: &ElementHandle) -> Result<bool> {
        let value = self.element_get(element, "displayed").await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        let value = self
            .element_get(element, &format!("attribute/{name}"))
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn property(&mut self, element: &ElementHandle, name: &str) -> Result<Option<Value>> {
        let value = self.element_get(element, &format!("property/{name}")).await?;
        Ok((!value.is_null()).then_some(value))
    }

    async fn set_attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
        value: &str,
    ) -> Result<()> {
        let script = "arguments[0].setAttribute(arguments[1], arguments[2]);";
        self.post(
            "/execute/sync",
            json!({ "script": script, "args": [element_reference(element), name, value] }),
        )
        .await
        .map(|_| ())
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<()> {
        self.element_post(element, "click", json!({})).await
    }

    async fn hover(&mut self, element: &ElementHandle) -> Result<()> {
        let actions = json!({
            "actions": [{
                "type": "pointer",
                "id": "mouse",
                "parameters": { "pointerType": "mouse" },
                "actions": [{
                    "type": "pointerMove",
                    "duration": 0,
                    "origin": element_reference(element),
                    "x": 0,
                    "y": 0
                }]
            }]
        });
        self.post("/actions", actions).await.map(|_| ())
    }

    async fn clear(&mut self, element: &ElementHandle) -> Result<()> {
        self.element_post(element, "clear", json!({})).await
    }

    async fn send_keys(&mut self, element: &ElementHandle, text: &str) -> Result<()> {
        self.element_post(element, "value", json!({ "text": text }))
            .await
    }

    async fn add_cookie(&mut self, cookie: &Cookie) -> Result<()> {
        self.post("/cookie", json!({ "cookie": cookie }))
            .await
            .map(|_| ())
    }

    async fn cookies(&mut self) -> Result<Vec<Cookie>> {
        let value = self.get("/cookie").await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn delete_cookie(&mut self, name: &str) -> Result<()> {
        self.command(Method::DELETE, &format!("/cookie/{name}"), None)
            .await
            .map(|_| ())
    }

    async fn delete_all_cookies(&mut self) -> Result<()> {
        self.command(Method::DELETE, "/cookie", None).await.map(|_| ())
    }

    async fn set_window_size(&mut self, width: u64, height: u64) -> Result<()> {
        self.post("/window/rect", json!({ "width": width, "height": height }))
            .await
            .map(|_| ())
    }

    async fn quit(&mut self) -> Result<()> {
        tracing::debug!(browser = %self.target, "Ending WebDriver session");
        self.command(Method::DELETE, "", None).await.map(|_| ())
    }
}

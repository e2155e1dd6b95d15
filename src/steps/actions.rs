//! Built-in browser actions

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{ActionEnv, Outcome, ResolvedStep, StepHandler};
use crate::browser::{BrowserSession, Cookie, ElementHandle, Locator};
use crate::common::{Error, Result};
use crate::registry::{ActionType, Category, Vocabulary};

/// First element matching the locator
pub(crate) async fn find_one(
    session: &mut dyn BrowserSession,
    locator: &Locator,
) -> Result<ElementHandle> {
    session
        .find_elements(locator)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::ElementNotFound(locator.to_string()))
}

/// Cookies from a `cookieJar` parameter: one cookie object or a list of them
fn cookie_jar(step: &ResolvedStep) -> Result<Vec<Cookie>> {
    let jar = step.require("cookieJar")?;
    let cookies = match jar {
        Value::Array(items) => items
            .iter()
            .map(|item| serde_json::from_value(item.clone()))
            .collect::<std::result::Result<Vec<Cookie>, _>>(),
        other => serde_json::from_value(other.clone()).map(|cookie| vec![cookie]),
    };
    cookies.map_err(|e| Error::invalid_step(step.action.name(), format!("invalid cookie: {e}")))
}

/// Actions that issue one or a few browser commands
pub struct BrowserAction;

#[async_trait]
impl StepHandler for BrowserAction {
    async fn perform(&self, step: &ResolvedStep, env: &mut ActionEnv<'_>) -> Result<Outcome> {
        let session = &mut *env.session;
        match &step.action {
            ActionType::Click => {
                let element = find_one(session, step.require_locator()?).await?;
                session.click(&element).await?;
            }
            ActionType::Clear => {
                let element = find_one(session, step.require_locator()?).await?;
                session.clear(&element).await?;
            }
            ActionType::Hover => {
                let element = find_one(session, step.require_locator()?).await?;
                session.hover(&element).await?;
            }
            ActionType::SendKeys => {
                let data = step.require_str("data")?;
                let element = find_one(session, step.require_locator()?).await?;
                session.send_keys(&element, &data).await?;
            }
            ActionType::SetAttribute => {
                let name = step.require_str("attribute")?;
                let value = step.require_str("value")?;
                let element = find_one(session, step.require_locator()?).await?;
                session.set_attribute(&element, &name, &value).await?;
            }
            ActionType::NavigateTo => {
                let url = match &step.locator {
                    Some(locator) => locator.selector.clone(),
                    None => step.require_str("url")?,
                };
                session.navigate(&url).await?;
            }
            ActionType::Refresh => session.refresh().await?,
            ActionType::NavigateBack => session.back().await?,
            ActionType::NavigateForward => session.forward().await?,
            ActionType::SetBrowserSize => {
                let width = step.require_u64("width")?;
                let height = step.require_u64("height")?;
                session.set_window_size(width, height).await?;
            }
            ActionType::AddCookies => {
                for cookie in cookie_jar(step)? {
                    session.add_cookie(&cookie).await?;
                }
            }
            ActionType::SetCookies => {
                let cookies = cookie_jar(step)?;
                session.delete_all_cookies().await?;
                for cookie in cookies {
                    session.add_cookie(&cookie).await?;
                }
            }
            ActionType::RemoveCookie => {
                let name = step.require_str("cookieName")?;
                session.delete_cookie(&name).await?;
            }
            ActionType::ClearCookies => session.delete_all_cookies().await?,
            other => {
                return Err(Error::NoHandler {
                    category: Category::ActionType,
                    name: other.name().to_string(),
                })
            }
        }
        Ok(Outcome::done())
    }
}

/// `WaitForExistence` and `WaitForVisibility`: poll until the element is
/// there, or fail once the timeout passes
pub struct WaitFor;

impl WaitFor {
    fn timeout(step: &ResolvedStep, env: &ActionEnv<'_>) -> Result<Duration> {
        match step.param("timeoutInSeconds") {
            None => Ok(env.timeouts.wait_default()),
            Some(value) => value
                .as_f64()
                .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(Duration::from_secs_f64)
                .ok_or_else(|| {
                    Error::invalid_step(
                        step.action.name(),
                        format!("timeoutInSeconds must be a non-negative number, got {value}"),
                    )
                }),
        }
    }

    async fn satisfied(
        action: &ActionType,
        session: &mut dyn BrowserSession,
        locator: &Locator,
    ) -> Result<bool> {
        let elements = session.find_elements(locator).await?;
        if *action != ActionType::WaitForVisibility {
            return Ok(!elements.is_empty());
        }
        for element in &elements {
            if session.is_displayed(element).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[async_trait]
impl StepHandler for WaitFor {
    async fn perform(&self, step: &ResolvedStep, env: &mut ActionEnv<'_>) -> Result<Outcome> {
        let locator = step.require_locator()?;
        let timeout = Self::timeout(step, env)?;
        let interval = env.timeouts.poll_interval();
        let session = &mut *env.session;

        let poll = async {
            loop {
                if Self::satisfied(&step.action, session, locator).await? {
                    return Ok::<(), Error>(());
                }
                tokio::time::sleep(interval).await;
            }
        };

        match tokio::time::timeout(timeout, poll).await {
            Ok(result) => result.map(|()| Outcome::done()),
            Err(_) => {
                let condition = if step.action == ActionType::WaitForVisibility {
                    "visible"
                } else {
                    "present"
                };
                Ok(Outcome::Failed(format!(
                    "Timed out after {:.1}s waiting for {locator} to be {condition}",
                    timeout.as_secs_f64()
                )))
            }
        }
    }
}

//! `OutputValue`: read a value from the page and hand it to the runner,
//! which stores it under the step's `outputName`

use async_trait::async_trait;
use serde_json::Value;

use super::actions::find_one;
use super::{ActionEnv, Outcome, ResolvedStep, StepHandler};
use crate::common::{Error, Result};
use crate::registry::{Category, OutputSource, Vocabulary};

pub struct OutputValue;

impl OutputValue {
    fn source<'s>(step: &'s ResolvedStep) -> Result<&'s OutputSource> {
        step.output_source
            .as_ref()
            .ok_or_else(|| Error::invalid_step(step.action.name(), "missing parameter 'source'"))
    }
}

#[async_trait]
impl StepHandler for OutputValue {
    async fn perform(&self, step: &ResolvedStep, env: &mut ActionEnv<'_>) -> Result<Outcome> {
        if step.output_name.is_none() {
            return Err(Error::invalid_step(
                step.action.name(),
                "outputName is required",
            ));
        }
        let session = &mut *env.session;

        let value = match Self::source(step)? {
            OutputSource::Literal => match (step.param("value"), &step.locator) {
                (Some(value), _) => value.clone(),
                (None, Some(locator)) => Value::String(locator.selector.clone()),
                (None, None) => {
                    return Err(Error::invalid_step(
                        step.action.name(),
                        "a Literal output needs a 'value' parameter or a locator",
                    ))
                }
            },
            OutputSource::XPathText => {
                let element = find_one(session, step.require_locator()?).await?;
                Value::String(session.text(&element).await?)
            }
            OutputSource::XPathProperty => {
                let name = step.require_str("name")?;
                let element = find_one(session, step.require_locator()?).await?;
                session.property(&element, &name).await?.unwrap_or(Value::Null)
            }
            OutputSource::XPathAttribute => {
                let name = step.require_str("name")?;
                let element = find_one(session, step.require_locator()?).await?;
                session
                    .attribute(&element, &name)
                    .await?
                    .map(Value::String)
                    .unwrap_or(Value::Null)
            }
            OutputSource::Url => Value::String(session.current_url().await?),
            OutputSource::Extension(name) => {
                return Err(Error::NoHandler {
                    category: Category::OutputSource,
                    name: name.clone(),
                })
            }
        };

        Ok(Outcome::value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::scripted::{ScriptedBrowserFactory, ScriptedElement, ScriptedSite};
    use crate::browser::SessionFactory;
    use crate::common::config::Timeouts;
    use crate::context::{Context, RunOptions};
    use crate::registry::{BrowserTarget, Registry};
    use crate::steps::Step;
    use crate::validation_file::StepDef;
    use serde_json::json;

    const HOME: &str = "http://shop.test/";

    async fn capture(step: Value) -> Result<Outcome> {
        let factory = ScriptedBrowserFactory::new(ScriptedSite::new().page(
            HOME,
            vec![ScriptedElement::new("//h1")
                .text("Welcome")
                .attribute("data-id", "42")
                .property("childElementCount", json!(2))],
        ));
        let mut session = factory
            .start(&BrowserTarget::Chrome, &RunOptions::default())
            .await
            .unwrap();
        session.navigate(HOME).await.unwrap();

        let ctx = Context::new(Registry::builtin(), RunOptions::default());
        let def: StepDef = serde_json::from_value(step).unwrap();
        let resolved = Step::from_def(ctx.registry(), 0, &def)?.resolve(&ctx)?;

        let timeouts = Timeouts::default();
        let mut env = ActionEnv {
            session: session.as_mut(),
            timeouts: &timeouts,
        };
        OutputValue.perform(&resolved, &mut env).await
    }

    #[tokio::test]
    async fn test_sources() {
        let text = capture(json!({"type": "OutputValue", "locator": "//h1", "outputName": "t",
            "parameters": {"source": "XPathText"}}))
        .await
        .unwrap();
        assert_eq!(text, Outcome::value(json!("Welcome")));

        let attribute = capture(json!({"type": "OutputValue", "locator": "//h1", "outputName": "t",
            "parameters": {"source": "XPathAttribute", "name": "data-id"}}))
        .await
        .unwrap();
        assert_eq!(attribute, Outcome::value(json!("42")));

        let property = capture(json!({"type": "OutputValue", "locator": "//h1", "outputName": "t",
            "parameters": {"source": "XPathProperty", "name": "childElementCount"}}))
        .await
        .unwrap();
        assert_eq!(property, Outcome::value(json!(2)));

        let url = capture(json!({"type": "OutputValue", "outputName": "t", "parameters": {"source": "URL"}}))
            .await
            .unwrap();
        assert_eq!(url, Outcome::value(json!(HOME)));

        let literal = capture(json!({"type": "OutputValue", "outputName": "t",
            "parameters": {"source": "Literal", "value": [1, 2]}}))
        .await
        .unwrap();
        assert_eq!(literal, Outcome::value(json!([1, 2])));
    }

    #[tokio::test]
    async fn test_output_name_is_required() {
        let err = capture(json!({"type": "OutputValue", "parameters": {"source": "URL"}}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_STEP");
    }

    #[tokio::test]
    async fn test_unknown_source_is_rejected_at_plan_time() {
        let err = capture(json!({"type": "OutputValue", "outputName": "t", "parameters": {"source": "Clipboard"}}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_NAME");
    }
}

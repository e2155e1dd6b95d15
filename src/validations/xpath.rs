//! XPath validations
//!
//! The target is an XPath; the first matching element is checked. The
//! negated existence and visibility states treat a missing element as the
//! expected outcome. Every other state fails when nothing matches.

use async_trait::async_trait;
use serde_json::Value;

use super::compare::{search, Comparison};
use super::{ResolvedValidation, ValidationHandler};
use crate::browser::{BrowserSession, ElementHandle, Locator};
use crate::common::{Error, Result};
use crate::context::expression::value_to_string;
use crate::registry::{ValidationState, Vocabulary};
use crate::steps::{ActionEnv, Outcome};

pub struct XPathValidation;

impl XPathValidation {
    async fn check(
        validation: &ResolvedValidation,
        session: &mut dyn BrowserSession,
        element: &ElementHandle,
    ) -> Result<Outcome> {
        let target = &validation.target;
        let state = &validation.state;

        let outcome = match state {
            ValidationState::Visible => {
                let visible = session.is_displayed(element).await?;
                Outcome::check(visible, || format!("Element {target} is not visible"))
            }
            ValidationState::NotVisible => {
                let visible = session.is_displayed(element).await?;
                Outcome::check(!visible, || format!("Element {target} is visible"))
            }
            ValidationState::TextMatches | ValidationState::NotTextMatches => {
                let pattern = validation.require_pattern()?;
                let text = session.text(element).await?;
                let matched = search(&pattern, &text)?;
                let negated = *state == ValidationState::NotTextMatches;
                Outcome::check(matched != negated, || {
                    format!("Text of {target} \"{text}\" did not satisfy {state} /{pattern}/")
                })
            }
            ValidationState::HasProperty | ValidationState::NotHasProperty => {
                let name = validation.require_param("name")?;
                let present = session.property(element, &name).await?.is_some();
                let negated = *state == ValidationState::NotHasProperty;
                Outcome::check(present != negated, || {
                    format!("Element {target} did not satisfy {state} '{name}'")
                })
            }
            ValidationState::PropertyHasValue | ValidationState::NotPropertyHasValue => {
                let name = validation.require_param("name")?;
                let expected = validation.require_expected()?;
                let actual = session.property(element, &name).await?;
                let rendered = actual.as_ref().map(value_to_string);
                let negated = *state == ValidationState::NotPropertyHasValue;
                Outcome::check((rendered.as_deref() == Some(expected.as_str())) != negated, || {
                    format!(
                        "Property '{name}' of {target} is {}, which does not satisfy {state} \"{expected}\"",
                        actual.unwrap_or(Value::Null)
                    )
                })
            }
            ValidationState::HasAttribute | ValidationState::NotHasAttribute => {
                let name = validation.require_param("name")?;
                let present = session.attribute(element, &name).await?.is_some();
                let negated = *state == ValidationState::NotHasAttribute;
                Outcome::check(present != negated, || {
                    format!("Element {target} did not satisfy {state} '{name}'")
                })
            }
            ValidationState::AttributeHasValue | ValidationState::NotAttributeHasValue => {
                let name = validation.require_param("name")?;
                let expected = validation.require_expected()?;
                let actual = session.attribute(element, &name).await?;
                let negated = *state == ValidationState::NotAttributeHasValue;
                Outcome::check((actual.as_deref() == Some(expected.as_str())) != negated, || {
                    format!(
                        "Attribute '{name}' of {target} is {actual:?}, which does not satisfy {state} \"{expected}\""
                    )
                })
            }
            other => match Comparison::for_state(other) {
                Some((comparison, negated)) => {
                    let expected = match comparison {
                        Comparison::Matches => validation.require_pattern()?,
                        _ => validation.require_expected()?,
                    };
                    let text = session.text(element).await?;
                    let success = comparison.evaluate(&text, &expected)? != negated;
                    Outcome::check(success, || {
                        format!("Text of {target} \"{text}\" did not satisfy {other} \"{expected}\"")
                    })
                }
                None => {
                    return Err(Error::unsupported_state(
                        validation.validation_type.name(),
                        other.name(),
                    ))
                }
            },
        };
        Ok(outcome)
    }
}

#[async_trait]
impl ValidationHandler for XPathValidation {
    fn supports(&self, state: &ValidationState) -> bool {
        !state.is_extension()
    }

    async fn validate(
        &self,
        validation: &ResolvedValidation,
        env: &mut ActionEnv<'_>,
    ) -> Result<Outcome> {
        let target = &validation.target;
        let session = &mut *env.session;
        let elements = session.find_elements(&Locator::xpath(target.clone())).await?;

        match (&validation.state, elements.first()) {
            (ValidationState::Exists, found) => Ok(Outcome::check(found.is_some(), || {
                format!("No element matches {target}")
            })),
            (ValidationState::NotExists, found) => Ok(Outcome::check(found.is_none(), || {
                format!("{} element(s) match {target}", elements.len())
            })),
            (ValidationState::NotVisible, None) => Ok(Outcome::done()),
            (state, None) => Ok(Outcome::Failed(format!(
                "No element matches {target}, so {state} cannot hold"
            ))),
            (_, Some(element)) => Self::check(validation, session, element).await,
        }
    }
}

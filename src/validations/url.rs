//! URL validations
//!
//! With an expected value, `target` names the part of the current URL to
//! compare: empty or `url` for the whole URL exactly as the browser reports
//! it, or one of `scheme`, `host`, `port`, `path`, `query`, `fragment`.
//! Without one, `target` itself is the expected whole URL.

use async_trait::async_trait;

use super::compare::Comparison;
use super::{ResolvedValidation, ValidationHandler};
use crate::common::{Error, Result};
use crate::registry::{ValidationState, Vocabulary};
use crate::steps::{ActionEnv, Outcome};

/// Extract a component of `url`
pub fn component(url: &str, name: &str) -> Result<String> {
    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() || name == "url" || name == "href" {
        return Ok(url.to_string());
    }

    let parsed = reqwest::Url::parse(url)
        .map_err(|e| Error::Session(format!("current URL '{url}' cannot be parsed: {e}")))?;
    Ok(match name.as_str() {
        "scheme" | "protocol" => parsed.scheme().to_string(),
        "host" | "hostname" => parsed.host_str().unwrap_or_default().to_string(),
        "port" => parsed
            .port_or_known_default()
            .map(|port| port.to_string())
            .unwrap_or_default(),
        "path" | "pathname" => parsed.path().to_string(),
        "query" | "search" => parsed.query().unwrap_or_default().to_string(),
        "fragment" | "hash" => parsed.fragment().unwrap_or_default().to_string(),
        other => {
            return Err(Error::invalid_step(
                "URL",
                format!("unknown URL component '{other}'"),
            ))
        }
    })
}

pub struct UrlValidation;

impl UrlValidation {
    /// Which component to read and what to compare it with
    fn plan(validation: &ResolvedValidation, comparison: Comparison) -> Result<(String, String)> {
        let expected = match comparison {
            Comparison::Matches => validation
                .param_str("pattern")
                .or_else(|| validation.expected.clone()),
            _ => validation
                .expected
                .clone()
                .or_else(|| validation.param_str("value")),
        };
        match expected {
            Some(expected) => Ok((validation.target.clone(), expected)),
            None if !validation.target.is_empty() => Ok((String::new(), validation.target.clone())),
            None => validation.require_expected().map(|expected| (String::new(), expected)),
        }
    }
}

#[async_trait]
impl ValidationHandler for UrlValidation {
    fn supports(&self, state: &ValidationState) -> bool {
        Comparison::for_state(state).is_some()
    }

    async fn validate(
        &self,
        validation: &ResolvedValidation,
        env: &mut ActionEnv<'_>,
    ) -> Result<Outcome> {
        let (comparison, negated) = Comparison::for_state(&validation.state).ok_or_else(|| {
            Error::unsupported_state(
                validation.validation_type.name(),
                validation.state.name(),
            )
        })?;
        let (part, expected) = Self::plan(validation, comparison)?;

        let url = env.session.current_url().await?;
        let actual = component(&url, &part)?;
        let success = comparison.evaluate(&actual, &expected)? != negated;

        let label = if part.is_empty() { "URL".to_string() } else { format!("URL {part}") };
        Ok(Outcome::check(success, || {
            format!(
                "Expected {label} to satisfy {} \"{expected}\", got \"{actual}\"",
                validation.state
            )
        }))
    }
}

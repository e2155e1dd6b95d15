//! String comparisons shared by validation handlers

use regex::Regex;

use crate::common::{Error, Result};
use crate::registry::ValidationState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equals,
    Contains,
    /// Full-string regular expression match
    Matches,
}

impl Comparison {
    /// The comparison behind a state, and whether its result is negated
    pub fn for_state(state: &ValidationState) -> Option<(Comparison, bool)> {
        Some(match state {
            ValidationState::Equals => (Comparison::Equals, false),
            ValidationState::NotEquals => (Comparison::Equals, true),
            ValidationState::Contains => (Comparison::Contains, false),
            ValidationState::NotContains => (Comparison::Contains, true),
            ValidationState::Matches => (Comparison::Matches, false),
            ValidationState::NotMatches => (Comparison::Matches, true),
            _ => return None,
        })
    }

    pub fn evaluate(self, actual: &str, expected: &str) -> Result<bool> {
        match self {
            Comparison::Equals => Ok(actual == expected),
            Comparison::Contains => Ok(actual.contains(expected)),
            Comparison::Matches => full_match(expected, actual),
        }
    }
}

fn compile(source: &str, pattern: &str) -> Result<Regex> {
    Regex::new(source).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Whether `pattern` matches the whole of `text`
pub fn full_match(pattern: &str, text: &str) -> Result<bool> {
    Ok(compile(&format!("^(?:{pattern})$"), pattern)?.is_match(text))
}

/// Whether `pattern` matches anywhere in `text`
pub fn search(pattern: &str, text: &str) -> Result<bool> {
    Ok(compile(pattern, pattern)?.is_match(text))
}

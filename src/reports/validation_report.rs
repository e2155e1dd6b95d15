//! Outcome of a single validation

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Encode, Report};
use crate::common::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    #[serde(rename = "targetBrowser")]
    browser: String,
    #[serde(rename = "type")]
    validation_type: String,
    target: String,
    state: String,
    #[serde(rename = "passed")]
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    msg: Option<String>,
}

impl ValidationReport {
    pub fn new(
        browser: impl Into<String>,
        validation_type: impl Into<String>,
        target: impl Into<String>,
        state: impl Into<String>,
        success: bool,
        msg: Option<String>,
    ) -> Self {
        Self {
            browser: browser.into(),
            validation_type: validation_type.into(),
            target: target.into(),
            state: state.into(),
            success,
            msg,
        }
    }

    pub fn browser(&self) -> &str {
        &self.browser
    }

    pub fn validation_type(&self) -> &str {
        &self.validation_type
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn msg(&self) -> Option<&str> {
        self.msg.as_deref()
    }
}

impl Encode for ValidationReport {
    fn to_value(&self) -> Result<Value> {
        Report::Validation(self.clone()).to_value()
    }

    fn from_value(value: Value) -> Result<Self> {
        match Report::from_value(value)? {
            Report::Validation(report) => Ok(report),
            Report::StepFailure(_) => Err(Error::Parse(
                "expected a validationReport, found a stepFailureReport".to_string(),
            )),
        }
    }
}

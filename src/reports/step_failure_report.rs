//! A step that could not run, which ends its browser's setup

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Encode, Report};
use crate::common::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailureReport {
    #[serde(rename = "targetBrowser")]
    browser: String,
    #[serde(rename = "stepIndex")]
    index: usize,
    action: String,
    msg: String,
}

impl StepFailureReport {
    pub fn new(
        browser: impl Into<String>,
        index: usize,
        action: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self {
            browser: browser.into(),
            index,
            action: action.into(),
            msg: msg.into(),
        }
    }

    pub fn browser(&self) -> &str {
        &self.browser
    }

    /// Position in the combined list of steps followed by validations
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }
}

impl Encode for StepFailureReport {
    fn to_value(&self) -> Result<Value> {
        Report::StepFailure(self.clone()).to_value()
    }

    fn from_value(value: Value) -> Result<Self> {
        match Report::from_value(value)? {
            Report::StepFailure(report) => Ok(report),
            Report::Validation(_) => Err(Error::Parse(
                "expected a stepFailureReport, found a validationReport".to_string(),
            )),
        }
    }
}

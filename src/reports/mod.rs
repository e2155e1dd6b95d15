//! Reports produced by a run
//!
//! Every report serializes to an object with a single key naming its kind,
//! e.g. `{"validationReport": {...}}`, and a [`ReportSummary`] groups them by
//! browser.

mod step_failure_report;
mod summary;
mod validation_report;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::Result;

pub use step_failure_report::StepFailureReport;
pub use summary::{BrowserReports, Filter, ReportPredicate, ReportSummary, Tally};
pub use validation_report::ValidationReport;

/// Conversion to and from the structured and textual report forms
pub trait Encode: Sized {
    fn to_value(&self) -> Result<Value>;
    fn from_value(value: Value) -> Result<Self>;

    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_value()?)?)
    }

    fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }

    fn from_json(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }
}

fn encode_serde<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn decode_serde<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

/// Any report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Report {
    #[serde(rename = "validationReport")]
    Validation(ValidationReport),
    #[serde(rename = "stepFailureReport")]
    StepFailure(StepFailureReport),
}

impl Report {
    pub fn browser(&self) -> &str {
        match self {
            Report::Validation(r) => r.browser(),
            Report::StepFailure(r) => r.browser(),
        }
    }

    /// A step failure never counts as a success
    pub fn success(&self) -> bool {
        match self {
            Report::Validation(r) => r.success(),
            Report::StepFailure(_) => false,
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, Report::StepFailure(_))
    }

    pub fn msg(&self) -> Option<&str> {
        match self {
            Report::Validation(r) => r.msg(),
            Report::StepFailure(r) => Some(r.msg()),
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationReport> {
        match self {
            Report::Validation(r) => Some(r),
            Report::StepFailure(_) => None,
        }
    }

    pub fn as_step_failure(&self) -> Option<&StepFailureReport> {
        match self {
            Report::StepFailure(r) => Some(r),
            Report::Validation(_) => None,
        }
    }
}

impl From<ValidationReport> for Report {
    fn from(report: ValidationReport) -> Self {
        Report::Validation(report)
    }
}

impl From<StepFailureReport> for Report {
    fn from(report: StepFailureReport) -> Self {
        Report::StepFailure(report)
    }
}

impl Encode for Report {
    fn to_value(&self) -> Result<Value> {
        encode_serde(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        decode_serde(value)
    }
}

//! Validation file format
//!
//! Names (actions, validation types, states, browsers) stay plain strings
//! here; they are resolved against the registry when a browser pass is
//! planned, so plugins can contribute vocabulary.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::browser::Locator;
use crate::common::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidationFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub target_browsers: Vec<String>,
    /// Page to open before the first step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub definitions: Map<String, Value>,
    #[serde(default)]
    pub steps: Vec<StepDef>,
    #[serde(default)]
    pub validations: Vec<ValidationDef>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StepDef {
    #[serde(rename = "type")]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<Locator>,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidationDef {
    #[serde(rename = "type")]
    pub validation_type: String,
    #[serde(default)]
    pub target: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl ValidationFile {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Parse(e.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Parse(format!("{}: {e}", path.display())))
    }

    /// Steps and validations together
    pub fn len(&self) -> usize {
        self.steps.len() + self.validations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_file() {
        let file = ValidationFile::from_json(
            r#"{
                "description": "Search works",
                "targetBrowsers": ["Firefox", "CHROME"],
                "path": "https://shop.test",
                "definitions": {"Search": {"Box": "//input"}},
                "steps": [
                    {"type": "SendKeys", "locator": "$Search.Box", "parameters": {"data": "socks"}},
                    {"type": "OutputValue", "outputName": "title", "parameters": {"source": "XPathText"},
                     "locator": {"selector": "h1", "strategy": "TagName"}}
                ],
                "validations": [
                    {"type": "URL", "state": "Contains", "value": "search"},
                    {"type": "XPath", "target": "//li", "state": "Exists"}
                ],
                "metadata": {"owner": "web"}
            }"#,
        )
        .unwrap();

        assert_eq!(file.target_browsers, vec!["Firefox", "CHROME"]);
        assert_eq!(file.steps[1].output_name.as_deref(), Some("title"));
        assert_eq!(file.validations[0].target, "");
        assert_eq!(file.len(), 4);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = ValidationFile::from_json(r#"{"targetBrowser": ["Firefox"]}"#).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));

        let err = ValidationFile::from_json(r#"{"steps": [{"type": "Click", "selector": "//a"}]}"#)
            .unwrap_err();
        assert_eq!(err.code(), "PARSE");
    }

    #[test]
    fn test_empty_file_is_valid() {
        let file = ValidationFile::from_json("{}").unwrap();
        assert!(file.is_empty());
        assert!(file.target_browsers.is_empty());
    }

    #[test]
    fn test_validation_requires_state() {
        assert!(ValidationFile::from_json(r#"{"validations": [{"type": "XPath", "target": "//a"}]}"#).is_err());
    }
}

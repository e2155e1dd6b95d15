//! Configuration file handling

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Default run settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// WebDriver endpoints keyed by browser name (case-insensitive)
    #[serde(default)]
    pub webdriver: WebDriverConfig,

    /// Fixture files merged into every run's data store before any file
    /// given on the command line
    #[serde(default)]
    pub definitions: Vec<PathBuf>,
}

/// Default settings
#[derive(Debug, Deserialize)]
pub struct Defaults {
    /// Browsers used when neither the file nor the command line names any
    #[serde(default = "default_browsers")]
    pub browsers: Vec<String>,

    /// Run browsers without a visible window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Pass `--no-sandbox` to Chromium based browsers
    #[serde(default)]
    pub no_sandbox: bool,

    /// Pretty-print the report summary
    #[serde(default)]
    pub pretty: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            browsers: default_browsers(),
            headless: default_true(),
            no_sandbox: false,
            pretty: false,
        }
    }
}

fn default_browsers() -> Vec<String> {
    vec!["Firefox".to_string()]
}

fn default_true() -> bool {
    true
}

/// Timeout settings
#[derive(Debug, Clone, Deserialize)]
pub struct Timeouts {
    /// Default bound for wait-for actions without `timeoutInSeconds`
    #[serde(default = "default_wait")]
    pub wait_default_secs: u64,

    /// Polling interval used by wait-for actions
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Timeout for creating a browser session
    #[serde(default = "default_session_start")]
    pub session_start_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            wait_default_secs: default_wait(),
            poll_interval_ms: default_poll_interval(),
            session_start_secs: default_session_start(),
        }
    }
}

impl Timeouts {
    pub fn wait_default(&self) -> Duration {
        Duration::from_secs(self.wait_default_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn session_start(&self) -> Duration {
        Duration::from_secs(self.session_start_secs)
    }
}

fn default_wait() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    250
}
fn default_session_start() -> u64 {
    60
}

/// WebDriver endpoint configuration
#[derive(Debug, Deserialize)]
pub struct WebDriverConfig {
    /// Endpoint used for browsers without an explicit entry
    #[serde(default = "default_endpoint")]
    pub default_url: String,

    /// Per-browser endpoints, e.g. `chrome = "http://localhost:9515"`
    #[serde(flatten)]
    pub endpoints: HashMap<String, String>,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            default_url: default_endpoint(),
            endpoints: HashMap::new(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:4444".to_string()
}

impl WebDriverConfig {
    /// Get the endpoint for a browser, falling back to `default_url`
    pub fn endpoint_for(&self, browser: &str) -> &str {
        self.endpoints
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(browser))
            .map(|(_, url)| url.as_str())
            .unwrap_or(&self.default_url)
    }
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| super::Error::file_read(path, e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}

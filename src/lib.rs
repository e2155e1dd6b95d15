//! ui-validation - declarative browser UI validation
//!
//! A validation file lists setup steps and validations. The engine runs them
//! against each target browser through WebDriver and returns a
//! [`reports::ReportSummary`]. Plugins extend the vocabulary and hook into
//! the run through the [`registry`].

pub mod browser;
pub mod cli;
pub mod commands;
pub mod common;
pub mod context;
pub mod orchestrator;
pub mod registry;
pub mod reports;
pub mod runner;
pub mod steps;
pub mod validation_file;
pub mod validations;

// Re-export commonly used types for tests and plugins
pub use common::{Error, Result};
pub use context::{Context, RunOptions};
pub use orchestrator::UiValidation;
pub use registry::{Registry, RegistryBuilder};
pub use reports::{Encode, Report, ReportSummary};
pub use validation_file::ValidationFile;

//! Runs a validation file across its target browsers
//!
//! Browsers run one after another in the order requested. Each gets its own
//! group in the summary, whatever happens to the others.

mod browser_validations;

use std::sync::Arc;

use crate::browser::SessionFactory;
use crate::common::{Error, Result};
use crate::context::Context;
use crate::registry::{BrowserTarget, ValidateEvent};
use crate::reports::{ReportSummary, StepFailureReport};
use crate::validation_file::ValidationFile;

pub use browser_validations::{BrowserValidations, START_SESSION_ACTION};

pub struct UiValidation {
    file: ValidationFile,
    browsers: Vec<String>,
    factory: Arc<dyn SessionFactory>,
}

impl UiValidation {
    /// Validate `file` against its own `targetBrowsers`
    pub fn new(file: ValidationFile, factory: Arc<dyn SessionFactory>) -> Self {
        let browsers = file.target_browsers.clone();
        Self {
            file,
            browsers,
            factory,
        }
    }

    /// Replace the browser list, e.g. from the command line
    pub fn with_browsers(mut self, browsers: Vec<String>) -> Self {
        self.browsers = browsers;
        self
    }

    pub fn file(&self) -> &ValidationFile {
        &self.file
    }

    pub fn browsers(&self) -> &[String] {
        &self.browsers
    }

    /// Run every browser and collect the reports.
    ///
    /// The file's definitions are merged under whatever the context already
    /// holds, so fixtures loaded beforehand take precedence.
    pub async fn validate_all(&self, ctx: &mut Context) -> Result<ReportSummary> {
        if self.browsers.is_empty() {
            return Err(Error::NoBrowsers);
        }
        ctx.load_base_definitions(&self.file.definitions);

        let registry = Arc::clone(ctx.registry());
        let mut summary = ReportSummary::new();

        for name in &self.browsers {
            let target = match registry.resolve::<BrowserTarget>(name) {
                Ok(target) => target,
                Err(error) => {
                    tracing::error!(browser = %name, "{}", error);
                    let failure = StepFailureReport::new(
                        name.as_str(),
                        0,
                        START_SESSION_ACTION,
                        error.to_string(),
                    );
                    summary.push(name.as_str(), vec![failure.into()]);
                    continue;
                }
            };

            registry.pre_validate(&ValidateEvent {
                browser: &target,
                file: &self.file,
                context: ctx,
                summary: &summary,
            });

            let pass = BrowserValidations::new(&self.file, target.clone(), self.factory.as_ref());
            let reports = match pass.run(ctx).await {
                Ok(reports) => reports,
                Err(aborted) => {
                    tracing::error!(
                        browser = %target,
                        index = aborted.index,
                        action = %aborted.action,
                        code = aborted.error.code(),
                        "Browser run aborted: {}",
                        aborted.error
                    );
                    aborted.into_reports(&target.to_string())
                }
            };
            summary.push(target.to_string(), reports);

            registry.post_validate(&ValidateEvent {
                browser: &target,
                file: &self.file,
                context: ctx,
                summary: &summary,
            });
        }

        let tally = summary.tally();
        tracing::info!(
            total = tally.total_reports,
            successes = tally.successes,
            failures = tally.failures,
            critical = tally.critical_failures,
            "Validation finished"
        );
        Ok(summary)
    }
}

//! One browser's pass over a validation file

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;

use crate::browser::SessionFactory;
use crate::common::Error;
use crate::context::Context;
use crate::registry::BrowserTarget;
use crate::reports::Report;
use crate::runner::{panic_message, Plan, RunAborted, Runner, VALIDATE_ACTION};
use crate::validation_file::ValidationFile;

/// Action recorded when the browser session cannot be started
pub const START_SESSION_ACTION: &str = "StartSession";

/// Action recorded when opening the file's `path` fails
const OPEN_PATH_ACTION: &str = "NavigateTo";

/// Plans the pass, acquires a session, runs it, and always releases the
/// session exactly once, panics included
pub struct BrowserValidations<'a> {
    file: &'a ValidationFile,
    target: BrowserTarget,
    factory: &'a dyn SessionFactory,
}

impl<'a> BrowserValidations<'a> {
    pub fn new(file: &'a ValidationFile, target: BrowserTarget, factory: &'a dyn SessionFactory) -> Self {
        Self {
            file,
            target,
            factory,
        }
    }

    pub fn target(&self) -> &BrowserTarget {
        &self.target
    }

    #[tracing::instrument(skip(self, ctx), fields(browser = %self.target))]
    pub async fn run(&self, ctx: &mut Context) -> Result<Vec<Report>, RunAborted> {
        let plan = Plan::build(ctx.registry(), self.file)?;
        if plan.is_empty() {
            tracing::debug!(browser = %self.target, "Nothing to run, no session started");
            return Ok(Vec::new());
        }
        if ctx.has_driver() {
            return Err(RunAborted::new(0, START_SESSION_ACTION, Error::DriverBusy));
        }

        let session = self
            .factory
            .start(&self.target, ctx.options())
            .await
            .map_err(|error| RunAborted::new(0, START_SESSION_ACTION, error))?;
        if let Err(mut rejected) = ctx.attach_driver(session) {
            if let Err(e) = rejected.quit().await {
                tracing::warn!(browser = %self.target, "Failed to quit rejected session: {}", e);
            }
            return Err(RunAborted::new(0, START_SESSION_ACTION, Error::DriverBusy));
        }
        tracing::info!(browser = %self.target, steps = plan.steps.len(), validations = plan.validations.len(), "Browser session started");

        let outcome = AssertUnwindSafe(self.drive(ctx, &plan)).catch_unwind().await;
        self.release(ctx).await;

        match outcome {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(browser = %self.target, "Browser pass panicked: {}", message);
                Err(RunAborted::new(0, VALIDATE_ACTION, Error::HandlerPanicked(message)))
            }
        }
    }

    async fn drive(&self, ctx: &mut Context, plan: &Plan) -> Result<Vec<Report>, RunAborted> {
        if let Some(path) = &self.file.path {
            let open = async {
                let url = ctx.resolve_string(path)?;
                tracing::debug!(browser = %self.target, url = %url, "Opening start page");
                ctx.driver_mut()?.navigate(&url).await
            };
            open.await
                .map_err(|error| RunAborted::new(0, OPEN_PATH_ACTION, error))?;
        }
        Runner::new(ctx, self.target.clone()).run(plan).await
    }

    async fn release(&self, ctx: &mut Context) {
        let Some(mut session) = ctx.detach_driver() else {
            return;
        };
        match session.quit().await {
            Ok(()) => tracing::debug!(browser = %self.target, "Browser session closed"),
            Err(e) => tracing::warn!(browser = %self.target, "Failed to quit browser session: {}", e),
        }
    }
}

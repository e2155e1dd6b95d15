//! End-to-end tests for the validation engine
//!
//! These tests run validation files through the orchestrator against the
//! scripted browser, then inspect the report summary and the browser
//! journal. The last section drives the built binary with `--dry-run`.

use std::path::PathBuf;
use std::process::Command;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use ui_validation::browser::scripted::{Fault, ScriptedBrowserFactory, ScriptedElement, ScriptedSite};
use ui_validation::common::config::Timeouts;
use ui_validation::context::expression::Segment;
use ui_validation::context::RunFlag;
use ui_validation::orchestrator::START_SESSION_ACTION;
use ui_validation::registry::{ActionType, Plugin};
use ui_validation::steps::{ActionEnv, Outcome, ResolvedStep, StepHandler};
use ui_validation::{
    Context, Encode, Error, Registry, RegistryBuilder, ReportSummary, RunOptions, UiValidation,
    ValidationFile,
};

const LOGIN: &str = "http://shop.test/login";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn login_site() -> ScriptedSite {
    ScriptedSite::new().page(
        LOGIN,
        vec![
            ScriptedElement::new("//input[@id='user']").property("value", json!("")),
            ScriptedElement::new("//h1").text("Sign in"),
            ScriptedElement::new("//button[@type='submit']").text("Go"),
        ],
    )
}

fn context(registry: Arc<Registry>, options: RunOptions) -> Context {
    Context::new(registry, options).with_timeouts(Timeouts {
        wait_default_secs: 1,
        poll_interval_ms: 10,
        ..Timeouts::default()
    })
}

fn file(value: Value) -> ValidationFile {
    serde_json::from_value(value).unwrap()
}

async fn run(
    file: ValidationFile,
    factory: &ScriptedBrowserFactory,
    ctx: &mut Context,
) -> ui_validation::Result<ReportSummary> {
    UiValidation::new(file, Arc::new(factory.clone()))
        .validate_all(ctx)
        .await
}

// ============================================================================
// Full runs
// ============================================================================

#[tokio::test]
async fn test_login_fixture_passes_on_every_browser() {
    let file = ValidationFile::from_path(&fixture("login.json")).unwrap();
    let factory = ScriptedBrowserFactory::new(login_site());
    let mut ctx = context(Registry::builtin(), RunOptions::default());

    let summary = run(file, &factory, &mut ctx).await.unwrap();

    assert_eq!(summary.browsers().collect::<Vec<_>>(), vec!["Firefox", "Chrome"]);
    let tally = summary.tally();
    assert_eq!(tally.total_reports, 8);
    assert_eq!(tally.successes, 8);
    assert!(!summary.has_failures(), "{:?}", summary.fails());

    for browser in ["Firefox", "Chrome"] {
        assert_eq!(factory.count(browser, "start"), 1);
        assert_eq!(factory.count(browser, "quit"), 1);
        assert_eq!(factory.count(browser, "send_keys"), 1);
    }
    assert!(factory
        .journal()
        .contains(&"Firefox start headless=true".to_string()));
    assert!(factory.journal().contains(&"Firefox send_keys guest".to_string()));
    assert_eq!(ctx.outputs()["heading"], json!("Sign in"));

    // Reports carry the target as written in the file
    let chrome = summary.reports_for("Chrome").unwrap();
    assert_eq!(chrome[3].as_validation().unwrap().target(), "path");
    assert_eq!(chrome[0].as_validation().unwrap().validation_type(), "XPath");
}

#[tokio::test]
async fn test_fixtures_take_precedence_over_file_definitions() {
    let file = ValidationFile::from_path(&fixture("login.json")).unwrap();
    let factory = ScriptedBrowserFactory::new(login_site());
    let mut ctx = context(Registry::builtin(), RunOptions::default());
    ctx.load_definition_file(&fixture("users.json")).unwrap();

    let summary = run(file, &factory, &mut ctx).await.unwrap();

    assert!(!summary.has_failures(), "{:?}", summary.fails());
    assert!(factory.journal().contains(&"Chrome send_keys admin".to_string()));
    assert_eq!(ctx.data()["user"]["name"], json!("admin"));
    // Keys only the file defines are still merged in
    assert_eq!(ctx.data()["site"]["login"], json!(LOGIN));
}

#[tokio::test]
async fn test_summary_json_shape() {
    let file = ValidationFile::from_path(&fixture("login.json")).unwrap();
    let factory = ScriptedBrowserFactory::new(login_site());
    let mut ctx = context(Registry::builtin(), RunOptions::default());
    let summary = run(file, &factory, &mut ctx).await.unwrap();

    let value: Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
    let body = &value["reportSummary"];
    assert_eq!(body["totalReports"], json!(8));
    assert_eq!(body["criticalFailures"], json!(0));
    assert_eq!(body["browsers"].as_array().unwrap().len(), 2);

    let reparsed = ReportSummary::from_json(&summary.to_json_pretty().unwrap()).unwrap();
    assert_eq!(reparsed.tally(), summary.tally());
}

#[tokio::test]
async fn test_no_browsers_is_an_error() {
    let factory = ScriptedBrowserFactory::new(ScriptedSite::new());
    let mut ctx = context(Registry::builtin(), RunOptions::default());

    let err = run(file(json!({"steps": [{"type": "Refresh"}]})), &factory, &mut ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoBrowsers));
    assert!(factory.journal().is_empty());
}

#[tokio::test]
async fn test_repeated_browser_gets_a_group_per_request() {
    let factory = ScriptedBrowserFactory::new(login_site());
    let mut ctx = context(Registry::builtin(), RunOptions::default());

    let summary = UiValidation::new(
        ValidationFile::from_path(&fixture("login.json")).unwrap(),
        Arc::new(factory.clone()),
    )
    .with_browsers(vec!["Chrome".into(), "Firefox".into(), "Chrome".into()])
    .validate_all(&mut ctx)
    .await
    .unwrap();

    assert_eq!(
        summary.browsers().collect::<Vec<_>>(),
        vec!["Chrome", "Firefox", "Chrome"]
    );
    assert!(summary.groups().iter().all(|g| g.reports().len() == 4));
    assert_eq!(factory.count("Chrome", "quit"), 2);
}

#[tokio::test]
async fn test_empty_file_starts_no_session() {
    let factory = ScriptedBrowserFactory::new(ScriptedSite::new());
    let mut ctx = context(Registry::builtin(), RunOptions::default());

    let summary = run(file(json!({"targetBrowsers": ["Edge"]})), &factory, &mut ctx)
        .await
        .unwrap();
    assert_eq!(summary.reports_for("Edge").unwrap().len(), 0);
    assert!(factory.journal().is_empty());
}

// ============================================================================
// URLs and outputs
// ============================================================================

#[tokio::test]
async fn test_trailing_slash_is_significant() {
    let site = ScriptedSite::new().redirect("https://example.com", "https://example.com/");
    let factory = ScriptedBrowserFactory::new(site);
    let mut ctx = context(Registry::builtin(), RunOptions::default());

    let summary = run(
        file(json!({
            "targetBrowsers": ["Firefox"],
            "path": "https://example.com",
            "validations": [
                {"type": "URL", "state": "Equals", "value": "https://example.com"},
                {"type": "URL", "target": "https://example.com/", "state": "Equals"},
                {"type": "URL", "target": "path", "state": "Equals", "value": "/"}
            ]
        })),
        &factory,
        &mut ctx,
    )
    .await
    .unwrap();

    let reports = summary.reports_for("Firefox").unwrap();
    let results: Vec<bool> = reports.iter().map(|r| r.success()).collect();
    assert_eq!(results, vec![false, true, true]);
    assert!(reports[0].msg().unwrap().contains("https://example.com/"));
    assert!(!reports[0].is_critical());
}

#[tokio::test]
async fn test_navigate_then_compare_with_trailing_slash() {
    let factory = ScriptedBrowserFactory::new(ScriptedSite::new());
    let mut ctx = context(Registry::builtin(), RunOptions::default());

    let summary = run(
        file(json!({
            "targetBrowsers": ["Chrome"],
            "steps": [{"type": "NavigateTo", "parameters": {"url": "https://example.com"}}],
            "validations": [{"type": "URL", "state": "Equals", "value": "https://example.com/"}]
        })),
        &factory,
        &mut ctx,
    )
    .await
    .unwrap();

    let reports = summary.reports_for("Chrome").unwrap();
    assert_eq!(reports.len(), 1);
    let report = reports[0].as_validation().unwrap();
    assert!(!report.success());
    assert!(report.msg().unwrap().contains("https://example.com"));
}

#[tokio::test]
async fn test_output_value_feeds_later_steps() {
    let site = ScriptedSite::new().page(
        LOGIN,
        vec![
            ScriptedElement::new("//title").text("Welcome"),
            ScriptedElement::new("//input").property("value", json!("")),
        ],
    );
    let factory = ScriptedBrowserFactory::new(site);
    let mut ctx = context(Registry::builtin(), RunOptions::default());

    let summary = run(
        file(json!({
            "targetBrowsers": ["Firefox"],
            "path": LOGIN,
            "steps": [
                {"type": "OutputValue", "locator": "//title", "outputName": "page.title",
                 "parameters": {"source": "XPathText"}},
                {"type": "SendKeys", "locator": "//input", "parameters": {"data": "$page.title"}}
            ],
            "validations": [
                {"type": "XPath", "target": "//input", "state": "PropertyHasValue",
                 "value": "$page.title", "parameters": {"name": "value"}}
            ]
        })),
        &factory,
        &mut ctx,
    )
    .await
    .unwrap();

    assert!(!summary.has_failures(), "{:?}", summary.fails());
    assert!(factory.journal().contains(&"Firefox send_keys Welcome".to_string()));
    assert_eq!(ctx.outputs()["page"]["title"], json!("Welcome"));
}

#[tokio::test]
async fn test_wait_for_existence_polls_until_element_appears() {
    let site = ScriptedSite::new().page(
        LOGIN,
        vec![ScriptedElement::new("//div[@id='toast']").appears_after(3)],
    );
    let factory = ScriptedBrowserFactory::new(site);
    let mut ctx = context(Registry::builtin(), RunOptions::default());

    let summary = run(
        file(json!({
            "targetBrowsers": ["Chrome"],
            "path": LOGIN,
            "steps": [{"type": "WaitForExistence", "locator": "//div[@id='toast']",
                       "parameters": {"timeoutInSeconds": 5}}],
            "validations": [{"type": "XPath", "target": "//div[@id='toast']", "state": "Exists"}]
        })),
        &factory,
        &mut ctx,
    )
    .await
    .unwrap();

    assert!(!summary.has_failures(), "{:?}", summary.fails());
    assert!(factory.count("Chrome", "find") >= 4);
}

// ============================================================================
// Failures
// ============================================================================

fn failing_click_file() -> ValidationFile {
    file(json!({
        "targetBrowsers": ["Firefox"],
        "path": LOGIN,
        "steps": [
            {"type": "Refresh"},
            {"type": "Click", "locator": "//a[@id='missing']"}
        ],
        "validations": [{"type": "XPath", "target": "//h1", "state": "Exists"}]
    }))
}

#[tokio::test]
async fn test_failed_step_skips_validations() {
    let factory = ScriptedBrowserFactory::new(login_site());
    let mut ctx = context(Registry::builtin(), RunOptions::default());

    let summary = run(failing_click_file(), &factory, &mut ctx).await.unwrap();

    let reports = summary.reports_for("Firefox").unwrap();
    assert_eq!(reports.len(), 1);
    let failure = reports[0].as_step_failure().unwrap();
    assert_eq!(failure.index(), 1);
    assert_eq!(failure.action(), "Click");
    assert!(failure.msg().contains("//a[@id='missing']"));
    assert_eq!(summary.tally().critical_failures, 1);
    assert_eq!(factory.count("Firefox", "quit"), 1);
}

#[tokio::test]
async fn test_errored_validation_with_and_without_suppression() {
    let validations = json!({
        "targetBrowsers": ["Firefox"],
        "path": LOGIN,
        "steps": [{"type": "Refresh"}],
        "validations": [
            {"type": "XPath", "target": "//h1", "state": "Exists"},
            {"type": "XPath", "target": "//h1", "state": "HasAttribute"},
            {"type": "XPath", "target": "//h1", "state": "Visible"}
        ]
    });

    // Suppressed: the error becomes a failed report and the run goes on
    let factory = ScriptedBrowserFactory::new(login_site());
    let mut ctx = context(Registry::builtin(), RunOptions::default());
    let summary = run(file(validations.clone()), &factory, &mut ctx).await.unwrap();
    let reports = summary.reports_for("Firefox").unwrap();
    let results: Vec<bool> = reports.iter().map(|r| r.success()).collect();
    assert_eq!(results, vec![true, false, true]);
    assert!(reports[1].msg().unwrap().contains("missing parameter 'name'"));

    // Not suppressed: the pass stops at the error
    let factory = ScriptedBrowserFactory::new(login_site());
    let mut options = RunOptions::default();
    options.set(RunFlag::SuppressExceptions, false);
    let mut ctx = context(Registry::builtin(), options);
    let summary = run(file(validations), &factory, &mut ctx).await.unwrap();
    let reports = summary.reports_for("Firefox").unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports[0].success());
    let failure = reports[1].as_step_failure().unwrap();
    assert_eq!(failure.index(), 2);
    assert_eq!(failure.action(), "Validate");
    assert_eq!(factory.count("Firefox", "quit"), 1);
}

#[tokio::test]
async fn test_unresolved_expected_value_with_and_without_suppression() {
    let validations = json!({
        "targetBrowsers": ["Firefox"],
        "path": LOGIN,
        "validations": [
            {"type": "XPath", "target": "//h1", "state": "TextMatches", "value": "$nonexistent.path"},
            {"type": "XPath", "target": "//h1", "state": "Exists"}
        ]
    });

    // Suppressed: a failed report explains the expression, the next one still runs
    let factory = ScriptedBrowserFactory::new(login_site());
    let mut ctx = context(Registry::builtin(), RunOptions::default());
    let summary = run(file(validations.clone()), &factory, &mut ctx).await.unwrap();
    let reports = summary.reports_for("Firefox").unwrap();
    assert_eq!(reports.len(), 2);
    let unresolved = reports[0].as_validation().unwrap();
    assert!(!unresolved.success());
    assert!(unresolved.msg().unwrap().contains("$nonexistent.path"));
    assert!(reports[1].success());

    // Not suppressed: the browser's run stops at the first validation
    let factory = ScriptedBrowserFactory::new(login_site());
    let mut options = RunOptions::default();
    options.set(RunFlag::SuppressExceptions, false);
    let mut ctx = context(Registry::builtin(), options);
    let summary = run(file(validations), &factory, &mut ctx).await.unwrap();
    let reports = summary.reports_for("Firefox").unwrap();
    assert_eq!(reports.len(), 1);
    let failure = reports[0].as_step_failure().unwrap();
    assert_eq!((failure.index(), failure.action()), (0, "Validate"));
    assert!(failure.msg().contains("$nonexistent.path"));
    assert_eq!(factory.count("Firefox", "quit"), 1);
}

#[tokio::test]
async fn test_session_start_failure_is_contained() {
    let factory = ScriptedBrowserFactory::new(login_site()).fail_start("Chrome");
    let mut ctx = context(Registry::builtin(), RunOptions::default());

    let mut login = ValidationFile::from_path(&fixture("login.json")).unwrap();
    login.target_browsers = vec!["Chrome".into(), "Firefox".into()];
    let summary = run(login, &factory, &mut ctx).await.unwrap();

    let chrome = summary.reports_for("Chrome").unwrap();
    assert_eq!(chrome.len(), 1);
    let failure = chrome[0].as_step_failure().unwrap();
    assert_eq!((failure.index(), failure.action()), (0, START_SESSION_ACTION));
    assert_eq!(factory.count("Chrome", "quit"), 0);

    let firefox = summary.reports_for("Firefox").unwrap();
    assert_eq!(firefox.len(), 4);
    assert!(firefox.iter().all(|r| r.success()));
}

#[tokio::test]
async fn test_unknown_browser_gets_failure_report() {
    let factory = ScriptedBrowserFactory::new(login_site());
    let mut ctx = context(Registry::builtin(), RunOptions::default());

    let summary = UiValidation::new(
        ValidationFile::from_path(&fixture("login.json")).unwrap(),
        Arc::new(factory.clone()),
    )
    .with_browsers(vec!["lynx".into(), "firefox".into()])
    .validate_all(&mut ctx)
    .await
    .unwrap();

    let lynx = summary.reports_for("lynx").unwrap();
    let failure = lynx[0].as_step_failure().unwrap();
    assert_eq!(failure.action(), START_SESSION_ACTION);
    assert!(failure.msg().contains("lynx"));
    assert_eq!(summary.reports_for("Firefox").unwrap().len(), 4);
}

#[tokio::test]
async fn test_panicking_driver_still_quits() {
    let factory = ScriptedBrowserFactory::new(login_site())
        .fault_for("Firefox", "click", Fault::Panic("driver exploded".into()))
        .fault_for("Chrome", "navigate", Fault::Panic("tab crashed".into()));
    let mut ctx = context(Registry::builtin(), RunOptions::default());

    let summary = run(
        ValidationFile::from_path(&fixture("login.json")).unwrap(),
        &factory,
        &mut ctx,
    )
    .await
    .unwrap();

    // Inside a handler: reported against the step
    let firefox = summary.reports_for("Firefox").unwrap();
    let failure = firefox[0].as_step_failure().unwrap();
    assert_eq!((failure.index(), failure.action()), (2, "Click"));
    assert!(failure.msg().contains("driver exploded"));

    // Opening the start page: the whole pass is reported
    let chrome = summary.reports_for("Chrome").unwrap();
    let failure = chrome[0].as_step_failure().unwrap();
    assert_eq!(failure.action(), "Validate");
    assert!(failure.msg().contains("tab crashed"));

    assert_eq!(factory.count("Firefox", "quit"), 1);
    assert_eq!(factory.count("Chrome", "quit"), 1);
    assert!(!ctx.has_driver());
}

#[tokio::test]
async fn test_failing_quit_does_not_fail_the_run() {
    let factory = ScriptedBrowserFactory::new(login_site())
        .fault("quit", Fault::Error("session already gone".into()));
    let mut ctx = context(Registry::builtin(), RunOptions::default());

    let summary = run(
        ValidationFile::from_path(&fixture("login.json")).unwrap(),
        &factory,
        &mut ctx,
    )
    .await
    .unwrap();

    assert!(!summary.has_failures());
    assert_eq!(factory.count("Firefox", "quit"), 1);
    assert_eq!(factory.count("Chrome", "quit"), 1);
}

// ============================================================================
// Plugins
// ============================================================================

struct Screenshot;

#[async_trait]
impl StepHandler for Screenshot {
    async fn perform(
        &self,
        _step: &ResolvedStep,
        env: &mut ActionEnv<'_>,
    ) -> ui_validation::Result<Outcome> {
        let url = env.session.current_url().await?;
        Ok(Outcome::value(json!(format!("{url}#shot"))))
    }
}

struct ScreenshotPlugin {
    events: Arc<Mutex<Vec<String>>>,
}

impl Plugin for ScreenshotPlugin {
    fn name(&self) -> &str {
        "screenshots"
    }

    fn register(&self, registry: &mut RegistryBuilder) {
        let pre = Arc::clone(&self.events);
        let post = Arc::clone(&self.events);
        registry
            .name_resolver::<ActionType>(self.name(), |name| {
                name.eq_ignore_ascii_case("screenshot")
                    .then(|| ActionType::Extension("Screenshot".into()))
            })
            .step_handler(self.name(), |action| match action {
                ActionType::Extension(name) if name == "Screenshot" => {
                    Some(Arc::new(Screenshot) as Arc<dyn StepHandler>)
                }
                _ => None,
            })
            .expression_root(self.name(), |root, rest| match (root, rest) {
                ("shots", [Segment::Field(field)]) if field == "dir" => Some(json!("/tmp/shots")),
                _ => None,
            })
            .pre_validate(self.name(), move |event| {
                pre.lock().unwrap().push(format!("pre {}", event.browser));
            })
            .post_validate(self.name(), move |event| {
                let count = event
                    .summary
                    .reports_for(event.browser.to_string().as_str())
                    .map_or(0, |reports| reports.len());
                post.lock().unwrap().push(format!("post {} {count}", event.browser));
            });
    }
}

#[tokio::test]
async fn test_plugin_extends_vocabulary_and_observes_runs() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut builder = Registry::builder();
    builder.plugin(&ScreenshotPlugin {
        events: Arc::clone(&events),
    });
    let registry = builder.build();

    let factory = ScriptedBrowserFactory::new(login_site());
    let mut ctx = context(registry, RunOptions::default());
    let summary = run(
        file(json!({
            "targetBrowsers": ["Firefox", "Edge"],
            "path": LOGIN,
            "steps": [
                {"type": "screenshot", "outputName": "shot"},
                {"type": "SendKeys", "locator": "//input[@id='user']",
                 "parameters": {"data": "$shots.dir"}}
            ],
            "validations": [{"type": "URL", "state": "NotEquals", "value": "$shot"}]
        })),
        &factory,
        &mut ctx,
    )
    .await
    .unwrap();

    assert!(!summary.has_failures(), "{:?}", summary.fails());
    assert_eq!(ctx.outputs()["shot"], json!(format!("{LOGIN}#shot")));
    assert!(factory.journal().contains(&"Edge send_keys /tmp/shots".to_string()));
    assert_eq!(
        *events.lock().unwrap(),
        vec!["pre Firefox", "post Firefox 1", "pre Edge", "post Edge 1"]
    );
}

#[tokio::test]
async fn test_plugin_handler_replaces_builtin() {
    struct Blocked;

    #[async_trait]
    impl StepHandler for Blocked {
        async fn perform(
            &self,
            _step: &ResolvedStep,
            _env: &mut ActionEnv<'_>,
        ) -> ui_validation::Result<Outcome> {
            Ok(Outcome::Failed("clicks are disabled".into()))
        }
    }

    let mut builder = Registry::builder();
    builder
        .step_handler("kiosk", |action| {
            (*action == ActionType::Click).then(|| Arc::new(Blocked) as Arc<dyn StepHandler>)
        })
        .step_handler("later", |action| {
            (*action == ActionType::Click).then(|| Arc::new(Screenshot) as Arc<dyn StepHandler>)
        });
    let registry = builder.build();

    let factory = ScriptedBrowserFactory::new(login_site());
    let mut ctx = context(registry, RunOptions::default());
    let summary = run(failing_click_file(), &factory, &mut ctx).await.unwrap();

    // The first hook that answers wins
    let reports = summary.reports_for("Firefox").unwrap();
    let failure = reports[0].as_step_failure().unwrap();
    assert_eq!((failure.index(), failure.msg()), (1, "clicks are disabled"));
    assert_eq!(factory.count("Firefox", "click"), 0);
}

#[test]
fn test_context_factory_hook_supplies_context() {
    let mut builder = Registry::builder();
    builder.context_factory("seeded", |options| {
        let mut ctx = Context::new(Registry::builtin(), *options);
        ctx.load_definitions(json!({"env": {"stage": "qa"}}).as_object()?);
        Some(ctx)
    });
    let registry = builder.build();

    let ctx = Context::create(Arc::clone(&registry), RunOptions::default());
    assert_eq!(ctx.resolve("$env.stage").unwrap(), json!("qa"));
    assert!(Arc::ptr_eq(ctx.registry(), &registry));
}

// ============================================================================
// Command line
// ============================================================================

fn ui_validation() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_ui-validation"));
    command.env("UI_VALIDATION_CONFIG", fixture("missing-config.toml"));
    command
}

#[test]
fn test_cli_check_accepts_fixture() {
    let output = ui_validation()
        .args(["check"])
        .arg(fixture("login.json"))
        .output()
        .expect("Failed to run ui-validation");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_cli_dry_run_prints_summary() {
    let input = r#"{"validations": [{"type": "URL", "state": "Equals", "value": "about:blank"}]}"#;
    let output = ui_validation()
        .args(["run", "--dry-run", "--json", "-b", "Chrome", input])
        .output()
        .expect("Failed to run ui-validation");
    assert_eq!(output.status.code(), Some(0));

    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["reportSummary"]["successes"], json!(1));
    assert_eq!(
        summary["reportSummary"]["browsers"][0]["browser"],
        json!("Chrome")
    );
}

#[test]
fn test_cli_dry_run_exits_one_on_failure() {
    let input = r#"{"validations": [{"type": "XPath", "target": "//h1", "state": "Exists"}]}"#;
    let output = ui_validation()
        .args(["run", "--dry-run", "-j", input])
        .output()
        .expect("Failed to run ui-validation");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cli_dry_run_prints_captured_outputs() {
    let input = r#"{"steps": [{"type": "OutputValue", "outputName": "build.version",
        "parameters": {"source": "Literal", "value": "1.2.3"}}]}"#;
    let output = ui_validation()
        .args(["run", "--dry-run", "--json", "-b", "Firefox", input])
        .output()
        .expect("Failed to run ui-validation");
    assert_eq!(output.status.code(), Some(0));

    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["Outputs"]["build"]["version"], json!("1.2.3"));
    assert_eq!(result["reportSummary"]["totalReports"], json!(0));
}

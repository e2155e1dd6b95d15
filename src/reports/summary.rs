//! Reports grouped by browser

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_serde, encode_serde, Encode, Report};
use crate::common::Result;

/// All reports for one browser, in the order they were produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserReports {
    browser: String,
    reports: Vec<Report>,
}

impl BrowserReports {
    pub fn browser(&self) -> &str {
        &self.browser
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }
}

/// Report counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub total_reports: usize,
    pub successes: usize,
    /// Failed validations plus critical failures
    pub failures: usize,
    pub critical_failures: usize,
}

/// Something that can select reports
pub trait ReportPredicate {
    fn matches(&self, report: &Report) -> bool;
}

impl<F: Fn(&Report) -> bool> ReportPredicate for F {
    fn matches(&self, report: &Report) -> bool {
        self(report)
    }
}

/// Common report filters. Text comparisons ignore case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Browser(String),
    /// Validation type; never matches a step failure
    Type(String),
    /// Validation state; never matches a step failure
    State(String),
    Target(String),
    Success(bool),
    CriticalFailure,
    /// Every filter must match; empty matches everything
    All(Vec<Filter>),
}

impl ReportPredicate for Filter {
    fn matches(&self, report: &Report) -> bool {
        match self {
            Filter::Browser(browser) => report.browser().eq_ignore_ascii_case(browser),
            Filter::Type(kind) => report
                .as_validation()
                .is_some_and(|r| r.validation_type().eq_ignore_ascii_case(kind)),
            Filter::State(state) => report
                .as_validation()
                .is_some_and(|r| r.state().eq_ignore_ascii_case(state)),
            Filter::Target(target) => report
                .as_validation()
                .is_some_and(|r| r.target().eq_ignore_ascii_case(target)),
            Filter::Success(success) => report.success() == *success,
            Filter::CriticalFailure => report.is_critical(),
            Filter::All(filters) => filters.iter().all(|f| f.matches(report)),
        }
    }
}

/// Reports of a whole run, grouped by browser in the order browsers ran
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    groups: Vec<BrowserReports>,
}

impl ReportSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one browser run's reports as a new group. A browser requested
    /// twice gets two groups, in request order.
    pub fn push(&mut self, browser: impl Into<String>, reports: Vec<Report>) {
        self.groups.push(BrowserReports {
            browser: browser.into(),
            reports,
        });
    }

    pub fn groups(&self) -> &[BrowserReports] {
        &self.groups
    }

    pub fn browsers(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.browser.as_str())
    }

    pub fn reports_for(&self, browser: &str) -> Option<&[Report]> {
        self.groups
            .iter()
            .find(|g| g.browser.eq_ignore_ascii_case(browser))
            .map(|g| g.reports.as_slice())
    }

    /// Every report, browser by browser
    pub fn reports(&self) -> impl Iterator<Item = &Report> {
        self.groups.iter().flat_map(|g| g.reports.iter())
    }

    /// A new summary with only the matching reports. Browser groups are
    /// kept even when emptied.
    pub fn filter_by(&self, predicate: impl ReportPredicate) -> ReportSummary {
        ReportSummary {
            groups: self
                .groups
                .iter()
                .map(|g| BrowserReports {
                    browser: g.browser.clone(),
                    reports: g
                        .reports
                        .iter()
                        .filter(|r| predicate.matches(r))
                        .cloned()
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn successes(&self) -> Vec<&Report> {
        self.reports().filter(|r| r.success()).collect()
    }

    /// Failed validations and critical failures
    pub fn fails(&self) -> Vec<&Report> {
        self.reports().filter(|r| !r.success()).collect()
    }

    pub fn critical_failures(&self) -> Vec<&Report> {
        self.reports().filter(|r| r.is_critical()).collect()
    }

    pub fn tally(&self) -> Tally {
        self.reports().fold(Tally::default(), |mut tally, report| {
            tally.total_reports += 1;
            if report.success() {
                tally.successes += 1;
            } else {
                tally.failures += 1;
            }
            if report.is_critical() {
                tally.critical_failures += 1;
            }
            tally
        })
    }

    pub fn has_failures(&self) -> bool {
        self.reports().any(|r| !r.success())
    }
}

#[derive(Serialize)]
struct SummaryOut<'a> {
    #[serde(rename = "reportSummary")]
    body: SummaryBodyOut<'a>,
}

#[derive(Serialize)]
struct SummaryBodyOut<'a> {
    #[serde(flatten)]
    tally: Tally,
    browsers: &'a [BrowserReports],
}

/// Counts in imported summaries are ignored and recomputed
#[derive(Deserialize)]
struct SummaryIn {
    #[serde(rename = "reportSummary")]
    body: SummaryBodyIn,
}

#[derive(Deserialize)]
struct SummaryBodyIn {
    #[serde(default)]
    browsers: Vec<BrowserReports>,
}

impl Encode for ReportSummary {
    fn to_value(&self) -> Result<Value> {
        encode_serde(&SummaryOut {
            body: SummaryBodyOut {
                tally: self.tally(),
                browsers: &self.groups,
            },
        })
    }

    fn from_value(value: Value) -> Result<Self> {
        let summary: SummaryIn = decode_serde(value)?;
        Ok(ReportSummary {
            groups: summary.body.browsers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{StepFailureReport, ValidationReport};
    use proptest::prelude::*;
    use serde_json::json;

    fn validation(browser: &str, kind: &str, state: &str, success: bool) -> Report {
        ValidationReport::new(browser, kind, "//h1", state, success, None).into()
    }

    fn sample() -> ReportSummary {
        let mut summary = ReportSummary::new();
        summary.push(
            "Firefox",
            vec![
                validation("Firefox", "XPath", "Exists", true),
                validation("Firefox", "URL", "Equals", false),
            ],
        );
        summary.push(
            "Chrome",
            vec![
                validation("Chrome", "XPath", "Exists", true),
                StepFailureReport::new("Chrome", 1, "Click", "No element found").into(),
            ],
        );
        summary
    }

    #[test]
    fn test_tally() {
        let tally = sample().tally();
        assert_eq!(
            tally,
            Tally {
                total_reports: 4,
                successes: 2,
                failures: 2,
                critical_failures: 1,
            }
        );
    }

    #[test]
    fn test_views() {
        let summary = sample();
        assert_eq!(summary.successes().len(), 2);
        assert_eq!(summary.fails().len(), 2);
        assert_eq!(summary.critical_failures().len(), 1);
        assert!(summary.has_failures());
    }

    #[test]
    fn test_filters_ignore_case() {
        let summary = sample();
        let chrome = summary.filter_by(Filter::Browser("chrome".into()));
        assert_eq!(chrome.reports().count(), 2);
        assert_eq!(chrome.groups().len(), 2);
        assert_eq!(chrome.reports_for("Firefox").unwrap().len(), 0);

        let urls = summary.filter_by(Filter::Type("url".into()));
        assert_eq!(urls.reports().count(), 1);

        let failed_xpath = summary.filter_by(Filter::All(vec![
            Filter::Type("XPath".into()),
            Filter::Success(false),
        ]));
        assert_eq!(failed_xpath.reports().count(), 0);

        let critical = summary.filter_by(Filter::CriticalFailure);
        assert_eq!(critical.reports().count(), 1);
    }

    #[test]
    fn test_closure_filters() {
        let summary = sample();
        let with_msg = summary.filter_by(|r: &Report| r.msg().is_some());
        assert_eq!(with_msg.reports().count(), 1);
        assert_eq!(summary.filter_by(|_: &Report| true), summary);
    }

    #[test]
    fn test_serialized_shape_and_import() {
        let summary = sample();
        let value = summary.to_value().unwrap();
        assert_eq!(value["reportSummary"]["totalReports"], 4);
        assert_eq!(value["reportSummary"]["criticalFailures"], 1);
        assert_eq!(value["reportSummary"]["browsers"][0]["browser"], "Firefox");
        assert_eq!(ReportSummary::from_value(value).unwrap(), summary);
    }

    #[test]
    fn test_import_recomputes_counts() {
        let text = json!({"reportSummary": {
            "totalReports": 99,
            "successes": 99,
            "browsers": [{"browser": "Edge", "reports": [
                {"validationReport": {"targetBrowser": "Edge", "type": "XPath",
                    "target": "//a", "state": "Exists", "passed": false}}
            ]}]
        }})
        .to_string();
        let summary = ReportSummary::from_json(&text).unwrap();
        assert_eq!(summary.tally().total_reports, 1);
        assert_eq!(summary.tally().failures, 1);
    }

    #[test]
    fn test_repeated_browser_gets_its_own_group() {
        let mut summary = ReportSummary::new();
        summary.push("Firefox", vec![validation("Firefox", "XPath", "Exists", true)]);
        summary.push("Chrome", vec![]);
        summary.push("Firefox", vec![validation("Firefox", "XPath", "Visible", false)]);
        assert_eq!(summary.groups().len(), 3);
        assert_eq!(
            summary.browsers().collect::<Vec<_>>(),
            vec!["Firefox", "Chrome", "Firefox"]
        );
        assert_eq!(summary.tally().total_reports, 2);
    }

    fn arb_report() -> impl Strategy<Value = Report> {
        prop_oneof![
            (any::<bool>(), "[A-Za-z]{1,8}").prop_map(|(success, state)| {
                Report::from(ValidationReport::new("Firefox", "XPath", "//a", state, success, None))
            }),
            (0usize..20, "[a-z ]{0,12}").prop_map(|(index, msg)| {
                Report::from(StepFailureReport::new("Firefox", index, "Click", msg))
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_counts_add_up(reports in proptest::collection::vec(arb_report(), 0..30)) {
            let mut summary = ReportSummary::new();
            summary.push("Firefox", reports);
            let tally = summary.tally();
            prop_assert_eq!(tally.successes + tally.failures, tally.total_reports);
            prop_assert!(tally.critical_failures <= tally.failures);
            prop_assert_eq!(summary.successes().len(), tally.successes);
            prop_assert_eq!(summary.fails().len(), tally.failures);
        }

        #[test]
        fn prop_always_true_filter_is_identity(reports in proptest::collection::vec(arb_report(), 0..30)) {
            let mut summary = ReportSummary::new();
            summary.push("Firefox", reports);
            prop_assert_eq!(summary.filter_by(Filter::All(vec![])), summary.clone());
        }

        #[test]
        fn prop_json_round_trip(reports in proptest::collection::vec(arb_report(), 0..10)) {
            let mut summary = ReportSummary::new();
            summary.push("Firefox", reports);
            let text = summary.to_json().unwrap();
            prop_assert_eq!(ReportSummary::from_json(&text).unwrap(), summary);
        }
    }
}

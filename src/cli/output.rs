//! Human-readable output
//!
//! The report summary JSON is the program's stdout; everything here goes to
//! stderr so the two never mix.

use colored::Colorize;

use crate::reports::{Report, ReportSummary};

fn print_report(report: &Report) {
    match report {
        Report::Validation(r) => {
            let mark = if r.success() { "✓".green() } else { "✗".red() };
            let target = if r.target().is_empty() { "<url>" } else { r.target() };
            eprintln!(
                "  {} {} {} {}",
                mark,
                r.validation_type().cyan(),
                r.state(),
                target.dimmed()
            );
            if let Some(msg) = r.msg() {
                if !r.success() {
                    eprintln!("      {}", msg.dimmed());
                }
            }
        }
        Report::StepFailure(r) => {
            eprintln!(
                "  {} {} {}: {}",
                "✗".red().bold(),
                format!("step {}", r.index()).red(),
                r.action().bold(),
                r.msg()
            );
        }
    }
}

/// Per-browser listing followed by the totals line
pub fn print_summary(summary: &ReportSummary) {
    for group in summary.groups() {
        eprintln!("\n{}", group.browser().white().bold());
        if group.reports().is_empty() {
            eprintln!("  {}", "no reports".dimmed());
        }
        for report in group.reports() {
            print_report(report);
        }
    }

    let tally = summary.tally();
    let headline = if tally.failures == 0 {
        format!("✓ {} passed", tally.successes).green().bold()
    } else {
        format!("✗ {} failed", tally.failures).red().bold()
    };
    eprintln!(
        "\n{} {}",
        headline,
        format!(
            "({} reports, {} passed, {} critical)",
            tally.total_reports, tally.successes, tally.critical_failures
        )
        .dimmed()
    );
}

pub fn print_check_line(ok: bool, label: &str, detail: &str) {
    if ok {
        eprintln!("  {} {} {}", "✓".green(), label, detail.dimmed());
    } else {
        eprintln!("  {} {} {}", "✗".red(), label, detail.red());
    }
}

//! Output formatting for assistcheck results.
//!
//! Supports three output formats:
//! - JSON: structured report for programmatic consumption
//! - HTML: self-contained document for people
//! - Pretty: colored terminal summary
//!
//! The renderers are pure; [`write_reports`] persists the file formats.

use colored::*;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::check::{AssistantSuite, FullReport, Status};
use crate::error::FrameworkError;

/// File name of the JSON report.
pub const JSON_REPORT: &str = "test_report.json";
/// File name of the HTML report.
pub const HTML_REPORT: &str = "test_report.html";

// =============================================================================
// JSON Format
// =============================================================================

/// Render the report as pretty-printed JSON.
///
/// Suites and results keep their run order; statuses are upper-case text
/// and durations are seconds.
pub fn render_json(report: &FullReport) -> Result<String, FrameworkError> {
    Ok(serde_json::to_string_pretty(report)?)
}

// =============================================================================
// HTML Format
// =============================================================================

const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2rem; color: #1f2328; }
h1 { margin-bottom: 0.2rem; }
.meta { color: #656d76; margin-bottom: 1.5rem; }
.cards { display: flex; flex-wrap: wrap; gap: 1rem; margin-bottom: 2rem; }
.card { border: 1px solid #d0d7de; border-radius: 6px; padding: 0.8rem 1.2rem; min-width: 7rem; }
.card .value { font-size: 1.6rem; font-weight: 600; }
.card .label { color: #656d76; font-size: 0.85rem; }
table { border-collapse: collapse; width: 100%; margin-bottom: 2rem; }
th, td { border-bottom: 1px solid #d0d7de; padding: 0.4rem 0.6rem; text-align: left; }
th { cursor: pointer; background: #f6f8fa; user-select: none; }
tr.all-clear td:first-child { border-left: 4px solid #1a7f37; }
tr.has-failures td:first-child { border-left: 4px solid #cf222e; }
details { border: 1px solid #d0d7de; border-radius: 6px; margin-bottom: 0.8rem; padding: 0.4rem 0.8rem; }
summary { cursor: pointer; font-weight: 600; }
ul.results { list-style: none; padding-left: 0.5rem; }
ul.results li { margin: 0.3rem 0; }
.marker { display: inline-block; width: 4.5rem; font-family: monospace; font-weight: 600; }
.status-passed { color: #1a7f37; }
.status-failed { color: #cf222e; }
.status-error { color: #8250df; }
.status-skipped { color: #9a6700; }
.check { font-weight: 600; }
"#;

const HTML_SCRIPT: &str = r#"
function sortTable(table, column) {
  const body = table.tBodies[0];
  const rows = Array.from(body.rows);
  const ascending = table.dataset.sortColumn != column || table.dataset.sortOrder != "asc";
  rows.sort(function (a, b) {
    const x = a.cells[column].dataset.value || a.cells[column].textContent;
    const y = b.cells[column].dataset.value || b.cells[column].textContent;
    const nx = parseFloat(x), ny = parseFloat(y);
    const cmp = (!isNaN(nx) && !isNaN(ny)) ? nx - ny : x.localeCompare(y);
    return ascending ? cmp : -cmp;
  });
  rows.forEach(function (row) { body.appendChild(row); });
  table.dataset.sortColumn = column;
  table.dataset.sortOrder = ascending ? "asc" : "desc";
}
document.querySelectorAll("table.sortable th").forEach(function (th, index) {
  th.addEventListener("click", function () { sortTable(th.closest("table"), index); });
});
"#;

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn status_class(status: Status) -> &'static str {
    match status {
        Status::Passed => "status-passed",
        Status::Failed => "status-failed",
        Status::Skipped => "status-skipped",
        Status::Error => "status-error",
    }
}

fn suite_class(suite: &AssistantSuite) -> &'static str {
    if suite.has_problems() {
        "has-failures"
    } else {
        "all-clear"
    }
}

fn suite_label(suite: &AssistantSuite) -> &'static str {
    if suite.has_problems() {
        "Has failures"
    } else {
        "All clear"
    }
}

/// Render the report as a self-contained HTML document.
pub fn render_html(report: &FullReport) -> String {
    let counts = report.counts();
    let mut html = String::new();

    // Writing into a String cannot fail.
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Assistant Test Report</title>\n<style>{}</style>\n</head>\n<body>\n",
        HTML_STYLE
    );
    let _ = write!(
        html,
        "<h1>Assistant Test Report</h1>\n<div class=\"meta\">Generated {}</div>\n",
        escape_html(report.timestamp())
    );

    html.push_str("<div class=\"cards\">\n");
    let cards = [
        ("Total", counts.total_tests.to_string(), ""),
        ("Passed", counts.passed.to_string(), "status-passed"),
        ("Failed", counts.failed.to_string(), "status-failed"),
        ("Errors", counts.errors.to_string(), "status-error"),
        ("Skipped", counts.skipped.to_string(), "status-skipped"),
        ("Success rate", format!("{:.1}%", report.success_rate()), ""),
        ("Duration", format!("{:.2}s", report.duration()), ""),
    ];
    for (label, value, class) in cards {
        let _ = writeln!(
            html,
            "<div class=\"card\"><div class=\"value {}\">{}</div><div class=\"label\">{}</div></div>",
            class, value, label
        );
    }
    html.push_str("</div>\n");

    html.push_str("<h2>Assistants</h2>\n<table class=\"sortable\">\n<thead><tr>");
    for header in [
        "Assistant",
        "Module",
        "Status",
        "Total",
        "Passed",
        "Failed",
        "Errors",
        "Skipped",
        "Success rate",
        "Duration",
    ] {
        let _ = write!(html, "<th>{}</th>", header);
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for suite in report.suites() {
        let c = suite.counts();
        let _ = writeln!(
            html,
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td data-value=\"{:.4}\">{:.1}%</td>\
             <td data-value=\"{:.4}\">{:.2}s</td></tr>",
            suite_class(suite),
            escape_html(suite.assistant_name()),
            escape_html(suite.module_name()),
            suite_label(suite),
            c.total_tests,
            c.passed,
            c.failed,
            c.errors,
            c.skipped,
            suite.success_rate(),
            suite.success_rate(),
            suite.duration(),
            suite.duration()
        );
    }
    html.push_str("</tbody>\n</table>\n");

    html.push_str("<h2>Details</h2>\n");
    for suite in report.suites() {
        write_suite_panel(&mut html, suite);
    }

    let _ = write!(html, "<script>{}</script>\n</body>\n</html>\n", HTML_SCRIPT);
    html
}

fn write_suite_panel(html: &mut String, suite: &AssistantSuite) {
    let c = suite.counts();
    let _ = writeln!(
        html,
        "<details class=\"{}\"{}>\n<summary>{} <span class=\"meta\">({}, {}/{} passed, {:.2}s)</span></summary>",
        suite_class(suite),
        if suite.has_problems() { " open" } else { "" },
        escape_html(suite.assistant_name()),
        escape_html(suite.module_name()),
        c.passed,
        c.total_tests,
        suite.duration()
    );
    html.push_str("<ul class=\"results\">\n");
    for result in suite.results() {
        let _ = writeln!(
            html,
            "<li><span class=\"marker {}\">{}</span> <span class=\"check\">{}</span>: {}</li>",
            status_class(result.status),
            result.status,
            escape_html(&result.name),
            escape_html(&result.message)
        );
    }
    html.push_str("</ul>\n</details>\n");
}

// =============================================================================
// Persistence
// =============================================================================

/// Paths of the files written by [`write_reports`].
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub html: PathBuf,
}

fn write_file(path: &Path, content: &str) -> Result<(), FrameworkError> {
    fs::write(path, content).map_err(|source| FrameworkError::ReportWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the JSON and HTML reports into `out_dir`, creating it if needed.
///
/// Existing reports are overwritten.
pub fn write_reports(report: &FullReport, out_dir: &Path) -> Result<ReportPaths, FrameworkError> {
    fs::create_dir_all(out_dir).map_err(|source| FrameworkError::ReportWrite {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let paths = ReportPaths {
        json: out_dir.join(JSON_REPORT),
        html: out_dir.join(HTML_REPORT),
    };
    write_file(&paths.json, &render_json(report)?)?;
    write_file(&paths.html, &render_html(report))?;

    tracing::info!(
        json = %paths.json.display(),
        html = %paths.html.display(),
        "reports written"
    );
    Ok(paths)
}

// =============================================================================
// Pretty Format
// =============================================================================

fn colored_status(status: Status) -> ColoredString {
    match status {
        Status::Passed => "PASS ".green(),
        Status::Failed => "FAIL ".red(),
        Status::Error => "ERROR".magenta(),
        Status::Skipped => "SKIP ".yellow(),
    }
}

fn colored_rate(rate: f64) -> ColoredString {
    let text = format!("{:.1}%", rate);
    match rate {
        r if r >= 100.0 => text.green().bold(),
        r if r >= 80.0 => text.green(),
        r if r >= 50.0 => text.yellow(),
        _ => text.red(),
    }
}

/// Render the terminal summary.
///
/// Passing results are only counted; failures, errors and skips are listed.
pub fn render_pretty(report: &FullReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {} v{}",
        "assistcheck".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    let _ = writeln!(out);

    if report.suites().is_empty() {
        let _ = writeln!(out, "  {}", "No plugins found".dimmed());
        let _ = writeln!(out);
    }

    for suite in report.suites() {
        let c = suite.counts();
        let mark = if suite.has_problems() {
            "✗".red()
        } else {
            "✓".green()
        };
        let _ = writeln!(
            out,
            "  {} {} {}  {}/{} passed  {}",
            mark,
            suite.assistant_name().bold(),
            format!("({})", suite.module_name()).dimmed(),
            c.passed,
            c.total_tests,
            colored_rate(suite.success_rate())
        );
        for result in suite.results().iter().filter(|r| r.status != Status::Passed) {
            let _ = writeln!(
                out,
                "      {} {:<32} {}",
                colored_status(result.status),
                result.name.as_str().dimmed(),
                result.message
            );
        }
    }
    let _ = writeln!(out);

    let c = report.counts();
    let _ = writeln!(
        out,
        "  {}  total {}  {}  {}  {}  {}",
        "Summary:".bold(),
        c.total_tests,
        format!("passed {}", c.passed).green(),
        format!("failed {}", c.failed).red(),
        format!("errors {}", c.errors).magenta(),
        format!("skipped {}", c.skipped).yellow(),
    );
    let status = if report.has_problems() {
        "FAILED".red()
    } else {
        "PASSED".green()
    };
    let _ = writeln!(
        out,
        "  {}  Success rate: {}  {}",
        format!("Duration: {:.2}s", report.duration()).dimmed(),
        colored_rate(report.success_rate()),
        status
    );
    out
}

/// Print the terminal summary to stdout.
pub fn write_pretty(report: &FullReport) {
    print!("{}", render_pretty(report));
}

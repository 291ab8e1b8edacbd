use crate::model::{Issue, ScanResult, Severity, TestResult};
use colored::Colorize;
use std::fmt::Write;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Issue")]
    id: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Fixed In")]
    fixed_in: String,
}

/// Renders the human-readable test report shared by all plugins.
///
/// `details` adds plugin-specific lines under each scanned target.
pub fn render_test_report(
    scan_results: &[ScanResult],
    test_results: &[TestResult],
    errors: &[String],
    details: impl Fn(&ScanResult) -> Option<String>,
) -> String {
    let mut out = String::new();

    for scan_result in scan_results {
        let _ = writeln!(
            out,
            "{}",
            format!("Testing {}...", scan_result.display_target()).bold()
        );
        if let Some(detail) = details(scan_result) {
            let _ = writeln!(out, "{}", detail);
        }
    }
    let _ = writeln!(
        out,
        "Test completed at: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    out.push('\n');

    let mut rows: Vec<(Severity, IssueRow)> = test_results
        .iter()
        .flat_map(|result| result.issues.iter().map(move |issue| issue_row(result, issue)))
        .collect();
    rows.sort_by_key(|(severity, _)| *severity);

    if rows.is_empty() {
        let _ = writeln!(out, "{}", "No known issues found.".green());
    } else {
        let _ = writeln!(out, "Issues:");
        let table = Table::new(rows.into_iter().map(|(_, row)| row))
            .with(Style::rounded())
            .to_string();
        let _ = writeln!(out, "{}", table);
    }

    let dependencies: usize = test_results.iter().map(TestResult::dependency_count).sum();
    let issues: usize = test_results.iter().map(|r| r.issues.len()).sum();
    out.push('\n');
    let _ = writeln!(
        out,
        "Tested {} {} for known issues, found {} {}.",
        dependencies,
        plural(dependencies, "dependency", "dependencies"),
        issues,
        plural(issues, "issue", "issues"),
    );

    if !errors.is_empty() {
        out.push('\n');
        for error in errors {
            let _ = writeln!(out, "{}", error.red());
        }
    }

    out
}

fn issue_row(result: &TestResult, issue: &Issue) -> (Severity, IssueRow) {
    let data = result.issue_data(issue);
    let severity = data.map(|d| d.severity).unwrap_or(Severity::Unknown);

    let package = match &issue.pkg_version {
        Some(version) => format!("{}@{}", issue.pkg_name, version),
        None => issue.pkg_name.clone(),
    };

    (
        severity,
        IssueRow {
            severity: format_severity(severity),
            id: issue.issue_id.clone(),
            package,
            title: data
                .map(|d| d.title.clone())
                .unwrap_or_else(|| "-".to_string()),
            fixed_in: fixed_in(issue),
        },
    )
}

fn fixed_in(issue: &Issue) -> String {
    if let Some(version) = &issue.fix_info.nearest_fixed_in_version {
        return version.clone();
    }
    // Upgrade paths are lists of package specs, the last entry is the fix.
    issue
        .fix_info
        .upgrade_paths
        .iter()
        .filter_map(|path| path.as_array()?.last()?.as_str())
        .next()
        .map(str::to_string)
        .unwrap_or_else(|| "-".to_string())
}

fn format_severity(severity: Severity) -> String {
    let name = severity.display_name();
    match severity {
        Severity::Critical => name.red().bold().to_string(),
        Severity::High => name.red().to_string(),
        Severity::Medium => name.yellow().to_string(),
        Severity::Low => name.blue().to_string(),
        Severity::Unknown => name.to_string(),
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{EcosystemMonitorError, EcosystemMonitorResult};
use crate::options::Options;
use crate::projects::extra_projects_count;
use colored::Colorize;
use serde_json::{json, Value};
use std::path::Path;

/// Separator placed between report entries.
pub const SEPARATOR: &str = "\n-------------------------------------------------------\n";

/// Status code of the generic server error wrapper.
const SERVER_ERROR_CODE: u16 = 500;

/// A failed monitor submission as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorFailure {
    pub code: u16,
    pub message: String,
    pub user_message: Option<String>,
}

impl MonitorFailure {
    /// Wraps an error payload as an unexpected server error.
    pub fn server_error(payload: &str) -> Self {
        Self {
            code: SERVER_ERROR_CODE,
            message: format!(
                "Server returned unexpected error for the monitor request. Status code: {}, response: {}",
                SERVER_ERROR_CODE, payload
            ),
            user_message: Some(payload.to_string()).filter(|m| !m.trim().is_empty()),
        }
    }

    fn display_message(&self) -> &str {
        self.user_message
            .as_deref()
            .or(Some(self.message.as_str()).filter(|m| !m.trim().is_empty()))
            .unwrap_or("Unknown error")
    }
}

/// One entry of the combined monitor report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEntry {
    Success {
        path: String,
        project_id: String,
        text: String,
    },
    Failure {
        path: String,
        error: MonitorFailure,
    },
}

impl MonitorEntry {
    pub fn is_success(&self) -> bool {
        matches!(self, MonitorEntry::Success { .. })
    }

    fn render(&self) -> String {
        match self {
            MonitorEntry::Success { text, .. } => text.clone(),
            MonitorEntry::Failure { path, error } => {
                format!("\n\n{}\n{}", path.bold().red(), error.display_message())
            }
        }
    }

    /// JSON form of the entry. Success text that is already JSON is kept as is.
    fn to_json(&self) -> Value {
        match self {
            MonitorEntry::Success {
                path,
                project_id,
                text,
            } => serde_json::from_str(text)
                .unwrap_or_else(|_| json!({ "ok": true, "path": path, "id": project_id })),
            MonitorEntry::Failure { path, error } => json!({
                "ok": false,
                "path": path,
                "error": error.display_message(),
            }),
        }
    }
}

/// Combined monitor report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorReport {
    /// Every entry succeeded.
    Success(String),
    /// At least one entry failed; the text still holds every entry.
    Failure(String),
}

impl MonitorReport {
    pub fn text(&self) -> &str {
        match self {
            MonitorReport::Success(text) | MonitorReport::Failure(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, MonitorReport::Failure(_))
    }

    /// Converts a failed report into [`Error::MonitorFailed`].
    pub fn into_result(self) -> Result<String> {
        match self {
            MonitorReport::Success(text) => Ok(text),
            MonitorReport::Failure(text) => Err(Error::MonitorFailed(text)),
        }
    }
}

/// Formats the summary block for one monitored project.
///
/// In JSON mode the result is serialized with its manage URL instead.
pub fn format_monitor_output(
    result: &EcosystemMonitorResult,
    options: &Options,
    config: &Config,
    extra_projects: Option<usize>,
) -> Result<String> {
    let response = &result.response;
    let manage_url = config.manage_url(&response.org);

    if options.json {
        let mut value = serde_json::to_value(result)?;
        if let Some(object) = value.as_object_mut() {
            object.insert("manageUrl".to_string(), manage_url.into());
        }
        return Ok(serde_json::to_string(&value)?);
    }

    let name = response
        .project_name
        .as_deref()
        .or(result.scan_result.name.as_deref());
    let human_name = match name {
        Some(name) => format!("{} ({})", result.path, name),
        None => result.path.clone(),
    };
    let issues = if response.licenses_policy.is_some() {
        "license and vulnerability issues"
    } else {
        "issues"
    };

    let mut out = format!("\nMonitoring {}...\n\n", human_name)
        .bold()
        .to_string();
    out.push_str(&format!("Explore this snapshot at {}\n\n", response.uri));

    if let Some(count) = extra_projects {
        out.push_str(
            &format!(
                "Tip: Detected {} other {} at this path. Monitor each of them separately to track all their dependencies.\n\n",
                count,
                if count == 1 { "project" } else { "projects" }
            )
            .bold()
            .to_string(),
        );
    }

    if response.is_monitored {
        out.push_str(&format!(
            "Notifications about newly disclosed {} related to these dependencies will be emailed to you.\n",
            issues
        ));
    } else {
        out.push_str(
            &format!(
                "Project is inactive, so notifications are turned off.\nActivate this project here: {}\n\n",
                manage_url
            )
            .bold()
            .red()
            .to_string(),
        );
    }

    if response.trial_started {
        out.push_str(
            &format!(
                "You're over the free plan usage limit, and are now on a free 14-day premium trial.\nView plans here: {}\n\n",
                manage_url
            )
            .yellow()
            .to_string(),
        );
    }

    Ok(out)
}

/// Merges monitor results and errors into one report.
///
/// `base_results` are entries produced before the ecosystem run and are
/// kept in front. In JSON mode the report is a single JSON array holding
/// every entry, failures as `{"ok": false, "path", "error"}` objects.
pub fn render_monitor_report(
    base_results: Vec<MonitorEntry>,
    results: &[EcosystemMonitorResult],
    errors: &[EcosystemMonitorError],
    options: &Options,
    config: &Config,
) -> Result<MonitorReport> {
    let mut entries = base_results;

    for result in results {
        let extra_projects = extra_projects_count(Path::new(&result.path));
        entries.push(MonitorEntry::Success {
            path: result.path.clone(),
            project_id: result.response.id.clone(),
            text: format_monitor_output(result, options, config, extra_projects)?,
        });
    }

    for error in errors {
        entries.push(MonitorEntry::Failure {
            path: error.path.clone(),
            error: MonitorFailure::server_error(&error.error),
        });
    }

    let text = if options.json {
        let values: Vec<Value> = entries.iter().map(MonitorEntry::to_json).collect();
        serde_json::to_string_pretty(&values)?
    } else {
        entries
            .iter()
            .map(MonitorEntry::render)
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    };

    if entries.iter().all(MonitorEntry::is_success) {
        Ok(MonitorReport::Success(text))
    } else {
        Ok(MonitorReport::Failure(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{monitor_response, scan_result};

    fn monitor_result(path: &str, id: &str) -> EcosystemMonitorResult {
        EcosystemMonitorResult {
            response: monitor_response(id),
            path: path.to_string(),
            scan_result: scan_result(path),
        }
    }

    fn monitor_error(path: &str, error: &str) -> EcosystemMonitorError {
        EcosystemMonitorError {
            error: error.to_string(),
            path: path.to_string(),
            scan_result: scan_result(path),
        }
    }

    #[test]
    fn test_all_successes_render_without_failure() {
        let results = vec![monitor_result("./a", "p1"), monitor_result("./b", "p2")];

        let report = render_monitor_report(
            vec![],
            &results,
            &[],
            &Options::default(),
            &Config::default(),
        )
        .unwrap();

        assert!(!report.is_failure());
        assert!(report.text().contains("Monitoring ./a..."));
        assert!(report.text().contains("Monitoring ./b..."));
        assert_eq!(report.text().matches(SEPARATOR).count(), 1);
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_partial_failure_carries_whole_report() {
        let results = vec![monitor_result("./a", "p1")];
        let errors = vec![monitor_error("./b", "Bad gateway")];

        let report = render_monitor_report(
            vec![],
            &results,
            &errors,
            &Options::default(),
            &Config::default(),
        )
        .unwrap();

        assert!(report.is_failure());
        let err = report.into_result().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Monitoring ./a..."));
        assert!(message.contains("./b"));
        assert!(message.contains("Bad gateway"));
        // Successes come before failures
        assert!(message.find("Monitoring ./a").unwrap() < message.find("Bad gateway").unwrap());
    }

    #[test]
    fn test_base_results_come_first() {
        let base = vec![MonitorEntry::Success {
            path: "./legacy".to_string(),
            project_id: "p0".to_string(),
            text: "legacy project monitored".to_string(),
        }];
        let results = vec![monitor_result("./a", "p1")];

        let report =
            render_monitor_report(base, &results, &[], &Options::default(), &Config::default())
                .unwrap();

        assert!(report.text().starts_with("legacy project monitored"));
    }

    #[test]
    fn test_server_error_wrapper() {
        let failure = MonitorFailure::server_error("connection reset");
        assert_eq!(failure.code, 500);
        assert!(failure.message.contains("Status code: 500"));
        assert!(failure.message.ends_with("response: connection reset"));
        assert_eq!(failure.display_message(), "connection reset");

        let empty = MonitorFailure::server_error("");
        assert!(empty.display_message().starts_with("Server returned unexpected error"));
    }

    #[test]
    fn test_unknown_error_fallback() {
        let failure = MonitorFailure {
            code: 500,
            message: String::new(),
            user_message: None,
        };
        assert_eq!(failure.display_message(), "Unknown error");
    }

    #[test]
    fn test_inactive_project_links_manage_page() {
        colored::control::set_override(false);
        let mut result = monitor_result("./a", "p1");
        result.response.is_monitored = false;
        result.response.project_name = Some("svc".to_string());

        let text =
            format_monitor_output(&result, &Options::default(), &Config::default(), Some(1))
                .unwrap();

        assert!(text.contains("Monitoring ./a (svc)..."));
        assert!(text.contains("Tip: Detected 1 other project at this path."));
        assert!(text.contains("https://app.ecoscan.io/org/acme/manage"));
        assert!(!text.contains("Notifications about"));
    }

    #[test]
    fn test_json_output_includes_manage_url() {
        let result = monitor_result("./a", "p1");
        let options = Options {
            json: true,
            ..Default::default()
        };

        let text = format_monitor_output(&result, &options, &Config::default(), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["id"], "p1");
        assert_eq!(value["path"], "./a");
        assert_eq!(value["manageUrl"], "https://app.ecoscan.io/org/acme/manage");
    }

    #[test]
    fn test_json_report_is_one_array_with_failures() {
        let results = vec![monitor_result("./a", "p1"), monitor_result("./b", "p2")];
        let errors = vec![monitor_error("./c", "connection reset")];
        let options = Options {
            json: true,
            ..Default::default()
        };

        let report =
            render_monitor_report(vec![], &results, &errors, &options, &Config::default())
                .unwrap();

        assert!(report.is_failure());
        assert!(!report.text().contains(SEPARATOR.trim()));
        let value: Value = serde_json::from_str(report.text()).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["id"], "p1");
        assert_eq!(entries[0]["ok"], true);
        assert_eq!(entries[1]["manageUrl"], "https://app.ecoscan.io/org/acme/manage");
        assert_eq!(
            entries[2],
            json!({ "ok": false, "path": "./c", "error": "connection reset" })
        );
    }

    #[test]
    fn test_json_report_keeps_plain_base_entries() {
        let base = vec![MonitorEntry::Success {
            path: "./legacy".to_string(),
            project_id: "p0".to_string(),
            text: "legacy project monitored".to_string(),
        }];
        let options = Options {
            json: true,
            ..Default::default()
        };

        let report = render_monitor_report(base, &[], &[], &options, &Config::default()).unwrap();

        assert!(!report.is_failure());
        let value: Value = serde_json::from_str(report.text()).unwrap();
        assert_eq!(value, json!([{ "ok": true, "path": "./legacy", "id": "p0" }]));
    }
}

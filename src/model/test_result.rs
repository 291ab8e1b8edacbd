use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    #[serde(other)]
    Unknown,
}

impl Severity {
    pub fn display_name(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixInfo {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub upgrade_paths: Vec<serde_json::Value>,
    #[serde(default)]
    pub is_patchable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_fixed_in_version: Option<String>,
}

/// A vulnerable package found by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub pkg_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkg_version: Option<String>,
    pub issue_id: String,
    #[serde(default)]
    pub fix_info: FixInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueData {
    pub id: String,
    pub severity: Severity,
    pub title: String,
}

/// Response of the test endpoint. Never mutated after deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub issues_data: BTreeMap<String, IssueData>,
    #[serde(default)]
    pub dep_graph_data: serde_json::Value,
}

impl TestResult {
    /// Number of packages in the dependency graph, excluding the root.
    pub fn dependency_count(&self) -> usize {
        self.dep_graph_data
            .get("pkgs")
            .and_then(|p| p.as_array())
            .map(|pkgs| pkgs.len().saturating_sub(1))
            .unwrap_or(0)
    }

    pub fn issue_data(&self, issue: &Issue) -> Option<&IssueData> {
        self.issues_data.get(&issue.issue_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_test_result() {
        let result: TestResult = serde_json::from_value(json!({
            "issues": [{
                "pkgName": "zlib",
                "pkgVersion": "1.2.11",
                "issueId": "ZLIB-1",
                "fixInfo": { "isPatchable": false, "nearestFixedInVersion": "1.2.12" }
            }],
            "issuesData": {
                "ZLIB-1": { "id": "ZLIB-1", "severity": "critical", "title": "Heap overflow" }
            },
            "depGraphData": { "pkgs": [{ "id": "root" }, { "id": "zlib@1.2.11" }] }
        }))
        .unwrap();

        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.dependency_count(), 1);
        let data = result.issue_data(&result.issues[0]).unwrap();
        assert_eq!(data.severity, Severity::Critical);
        assert_eq!(
            result.issues[0].fix_info.nearest_fixed_in_version.as_deref(),
            Some("1.2.12")
        );
    }

    #[test]
    fn test_unknown_severity() {
        let data: IssueData =
            serde_json::from_value(json!({ "id": "X", "severity": "negligible", "title": "t" }))
                .unwrap();
        assert_eq!(data.severity, Severity::Unknown);
    }

    #[test]
    fn test_empty_graph_has_no_dependencies() {
        let result: TestResult = serde_json::from_value(json!({})).unwrap();
        assert_eq!(result.dependency_count(), 0);
        assert!(result.issues.is_empty());
    }
}

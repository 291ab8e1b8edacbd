use serde::{Deserialize, Serialize};

use super::ScanResult;

/// Submission method reported to the monitor endpoint.
pub const MONITOR_METHOD: &str = "cli";

/// Body of `PUT /monitor-dependencies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorDependenciesRequest {
    pub scan_result: ScanResult,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorDependenciesResponse {
    #[serde(default)]
    pub ok: bool,
    pub org: String,
    pub id: String,
    #[serde(default)]
    pub is_monitored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licenses_policy: Option<serde_json::Value>,
    pub uri: String,
    #[serde(default)]
    pub trial_started: bool,
    /// Server's view of the path; the local path on
    /// [`EcosystemMonitorResult`] is serialized instead.
    #[serde(default, skip_serializing)]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

/// A successful monitor submission, tied back to the path it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EcosystemMonitorResult {
    #[serde(flatten)]
    pub response: MonitorDependenciesResponse,
    pub path: String,
    pub scan_result: ScanResult,
}

/// A failed monitor submission for one scan result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EcosystemMonitorError {
    pub error: String,
    pub path: String,
    pub scan_result: ScanResult,
}

//! In-memory plugin and API doubles for orchestration tests.

use crate::api::DependencyApi;
use crate::error::{Error, Result};
use crate::model::{
    Fact, Identity, MonitorDependenciesRequest, MonitorDependenciesResponse, ScanResult,
    TestResult,
};
use crate::options::{Options, ScanOptions};
use crate::plugin::{Ecosystem, EcosystemPlugin};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

pub fn scan_result(path: &str) -> ScanResult {
    ScanResult::new(
        Identity::new("mock").with_arg("path", path),
        vec![Fact::new("depGraph", json!({ "path": path }))],
    )
}

pub fn api_error(status: u16, message: &str) -> Error {
    Error::Api {
        status,
        message: message.to_string(),
    }
}

pub fn test_result(issue_ids: &[&str]) -> TestResult {
    let issues: Vec<_> = issue_ids
        .iter()
        .map(|id| json!({ "pkgName": "pkg", "pkgVersion": "1.0.0", "issueId": id }))
        .collect();
    let issues_data: serde_json::Map<_, _> = issue_ids
        .iter()
        .map(|id| {
            (
                id.to_string(),
                json!({ "id": id, "severity": "high", "title": format!("{} title", id) }),
            )
        })
        .collect();
    serde_json::from_value(json!({
        "issues": issues,
        "issuesData": issues_data,
        "depGraphData": { "pkgs": [{ "id": "root" }, { "id": "pkg@1.0.0" }] }
    }))
    .unwrap()
}

pub fn monitor_response(id: &str) -> MonitorDependenciesResponse {
    MonitorDependenciesResponse {
        ok: true,
        org: "acme".to_string(),
        id: id.to_string(),
        is_monitored: true,
        licenses_policy: None,
        uri: format!("https://app.ecoscan.io/org/acme/project/{}", id),
        trial_started: false,
        path: None,
        project_name: None,
    }
}

/// Plugin that records the path of every scan.
pub struct MockPlugin {
    scanned: Mutex<Vec<String>>,
    fail_on: Option<String>,
    results_per_path: usize,
}

impl MockPlugin {
    pub fn new() -> Self {
        Self {
            scanned: Mutex::new(Vec::new()),
            fail_on: None,
            results_per_path: 1,
        }
    }

    pub fn failing_on(mut self, path: &str) -> Self {
        self.fail_on = Some(path.to_string());
        self
    }

    pub fn with_results_per_path(mut self, count: usize) -> Self {
        self.results_per_path = count;
        self
    }

    pub fn scanned_paths(&self) -> Vec<String> {
        self.scanned.lock().unwrap().clone()
    }
}

#[async_trait]
impl EcosystemPlugin for MockPlugin {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Native
    }

    async fn scan(&self, options: &ScanOptions<'_>) -> Result<Vec<ScanResult>> {
        self.scanned.lock().unwrap().push(options.path.to_string());
        if self.fail_on.as_deref() == Some(options.path) {
            return Err(Error::plugin(
                Ecosystem::Native,
                format!("cannot scan {}", options.path),
            ));
        }
        Ok(vec![scan_result(options.path); self.results_per_path])
    }

    async fn display(
        &self,
        scan_results: &[ScanResult],
        test_results: &[TestResult],
        errors: &[String],
        _options: &Options,
    ) -> Result<String> {
        Ok(format!(
            "{} scanned, {} tested, errors: [{}]",
            scan_results.len(),
            test_results.len(),
            errors.join("; ")
        ))
    }
}

/// API that replays scripted responses and records request bodies.
///
/// Calls beyond the script succeed.
#[derive(Default)]
pub struct MockApi {
    test_script: Mutex<VecDeque<Result<TestResult>>>,
    monitor_script: Mutex<VecDeque<Result<MonitorDependenciesResponse>>>,
    tested: Mutex<Vec<ScanResult>>,
    monitored: Mutex<Vec<MonitorDependenciesRequest>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_responses(self, responses: Vec<Result<TestResult>>) -> Self {
        *self.test_script.lock().unwrap() = responses.into();
        self
    }

    pub fn with_monitor_responses(self, responses: Vec<Result<MonitorDependenciesResponse>>) -> Self {
        *self.monitor_script.lock().unwrap() = responses.into();
        self
    }

    pub fn tested(&self) -> Vec<ScanResult> {
        self.tested.lock().unwrap().clone()
    }

    pub fn monitored(&self) -> Vec<MonitorDependenciesRequest> {
        self.monitored.lock().unwrap().clone()
    }
}

#[async_trait]
impl DependencyApi for MockApi {
    async fn test_dependencies(&self, scan_result: &ScanResult) -> Result<TestResult> {
        self.tested.lock().unwrap().push(scan_result.clone());
        self.test_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(test_result(&[])))
    }

    async fn monitor_dependencies(
        &self,
        request: &MonitorDependenciesRequest,
    ) -> Result<MonitorDependenciesResponse> {
        let mut monitored = self.monitored.lock().unwrap();
        monitored.push(request.clone());
        let call = monitored.len();
        drop(monitored);

        self.monitor_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(monitor_response(&format!("project-{}", call))))
    }
}

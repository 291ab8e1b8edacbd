use crate::api::DependencyApi;
use crate::error::Result;
use crate::model::{ScanResult, TestResult};
use crate::options::Options;
use crate::plugin::{get_plugin, Ecosystem, EcosystemPlugin};
use crate::progress::Progress;
use crate::scan::{scan_all, ScanResultsByPath};
use serde::Serialize;
use tracing::{info, warn};

/// Outcome of a `test` run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCommandResult {
    /// Plugin-rendered report. Absent in JSON mode.
    pub human_readable: Option<String>,
    /// Test results as a JSON array, in submission order.
    pub json: String,
    /// True when any test result reported at least one issue.
    pub vulnerable: bool,
}

impl TestCommandResult {
    /// The text to print: the human report when present, else the JSON.
    pub fn output(&self) -> &str {
        self.human_readable.as_deref().unwrap_or(&self.json)
    }
}

/// Scans `paths` with the ecosystem's plugin and tests every scan result.
pub async fn run_tests(
    ecosystem: Ecosystem,
    paths: &[String],
    options: &Options,
    api: &dyn DependencyApi,
) -> Result<TestCommandResult> {
    let plugin = get_plugin(ecosystem);
    run_tests_with(plugin.as_ref(), paths, options, api).await
}

/// [`run_tests`] with an explicit plugin.
pub async fn run_tests_with(
    plugin: &dyn EcosystemPlugin,
    paths: &[String],
    options: &Options,
    api: &dyn DependencyApi,
) -> Result<TestCommandResult> {
    let progress = Progress::new(!options.json);

    let scan_results_by_path = scan_all(plugin, paths, options, &progress).await?;
    let (test_results, errors) = test_dependencies(api, &scan_results_by_path, &progress).await?;
    progress.clear();

    let json = serde_json::to_string_pretty(&test_results)?;
    let vulnerable = test_results.iter().any(|r| !r.issues.is_empty());

    if options.json {
        return Ok(TestCommandResult {
            human_readable: None,
            json,
            vulnerable,
        });
    }

    let scan_results: Vec<ScanResult> = scan_results_by_path
        .into_iter()
        .flat_map(|p| p.scan_results)
        .collect();
    let rendered = plugin
        .display(&scan_results, &test_results, &errors, options)
        .await?;

    Ok(TestCommandResult {
        human_readable: Some(rendered),
        json,
        vulnerable,
    })
}

/// Submits every scan result to the test endpoint, one at a time.
///
/// A 4xx response aborts immediately. Other failures are recorded as a
/// per-path error and the remaining scan results are still tested.
pub async fn test_dependencies(
    api: &dyn DependencyApi,
    scan_results_by_path: &ScanResultsByPath,
    progress: &Progress,
) -> Result<(Vec<TestResult>, Vec<String>)> {
    let mut results = Vec::new();
    let mut errors = Vec::new();

    for entry in scan_results_by_path {
        progress.set_message(format!("Testing dependencies in {}...", entry.path));

        for scan_result in &entry.scan_results {
            match api.test_dependencies(scan_result).await {
                Ok(result) => {
                    info!(
                        "Tested {}: {} issues",
                        scan_result.display_target(),
                        result.issues.len()
                    );
                    results.push(result);
                }
                Err(e) if e.is_client_error() => {
                    warn!(status = ?e.status(), "Test request for {} rejected: {}", entry.path, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!(status = ?e.status(), "Could not test {}: {}", entry.path, e);
                    errors.push(format!("Could not test dependencies in {}", entry.path));
                }
            }
        }
    }

    Ok((results, errors))
}

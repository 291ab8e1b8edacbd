use crate::api::DependencyApi;
use crate::config::Config;
use crate::error::Result;
use crate::model::{
    EcosystemMonitorError, EcosystemMonitorResult, MonitorDependenciesRequest, ScanResult,
    MONITOR_METHOD, OS_RELEASE_FACT,
};
use crate::options::Options;
use crate::plugin::{get_plugin, Ecosystem, EcosystemPlugin};
use crate::progress::Progress;
use crate::scan::{scan_all, ScanResultsByPath};
use tracing::{info, warn};

/// Scans `paths` with the ecosystem's plugin and registers every scan
/// result for monitoring.
pub async fn monitor_all(
    ecosystem: Ecosystem,
    paths: &[String],
    options: &Options,
    config: &Config,
    api: &dyn DependencyApi,
) -> Result<(Vec<EcosystemMonitorResult>, Vec<EcosystemMonitorError>)> {
    let plugin = get_plugin(ecosystem);
    monitor_all_with(plugin.as_ref(), paths, options, config, api).await
}

/// [`monitor_all`] with an explicit plugin.
pub async fn monitor_all_with(
    plugin: &dyn EcosystemPlugin,
    paths: &[String],
    options: &Options,
    config: &Config,
    api: &dyn DependencyApi,
) -> Result<(Vec<EcosystemMonitorResult>, Vec<EcosystemMonitorError>)> {
    let progress = Progress::new(!options.json);

    let scan_results_by_path = scan_all(plugin, paths, options, &progress).await?;
    let outcome = monitor_dependencies(api, scan_results_by_path, options, config, &progress).await;
    progress.clear();

    outcome
}

/// Project name precedence: `--project-name`, then the configured name.
pub fn resolve_project_name(options: &Options, config: &Config) -> Option<String> {
    options
        .project_name
        .clone()
        .or_else(|| config.project_name.clone())
}

/// Drops facts that must not reach the monitor endpoint.
pub fn filter_facts(mut scan_result: ScanResult) -> ScanResult {
    scan_result.facts.retain(|fact| fact.fact_type != OS_RELEASE_FACT);
    scan_result
}

pub fn monitor_request(scan_result: ScanResult, project_name: Option<String>) -> MonitorDependenciesRequest {
    MonitorDependenciesRequest {
        scan_result: filter_facts(scan_result),
        method: MONITOR_METHOD.to_string(),
        project_name,
    }
}

/// Submits every scan result to the monitor endpoint, one at a time.
///
/// A 4xx response aborts immediately. Other failures become an
/// [`EcosystemMonitorError`] and the remaining scan results are still sent.
pub async fn monitor_dependencies(
    api: &dyn DependencyApi,
    scan_results_by_path: ScanResultsByPath,
    options: &Options,
    config: &Config,
    progress: &Progress,
) -> Result<(Vec<EcosystemMonitorResult>, Vec<EcosystemMonitorError>)> {
    let project_name = resolve_project_name(options, config);
    let mut results = Vec::new();
    let mut errors = Vec::new();

    for entry in scan_results_by_path {
        progress.set_message(format!("Monitoring dependencies in {}...", entry.path));

        for scan_result in entry.scan_results {
            let request = monitor_request(scan_result, project_name.clone());

            match api.monitor_dependencies(&request).await {
                Ok(response) => {
                    info!("Monitoring {} as project {}", entry.path, response.id);
                    results.push(EcosystemMonitorResult {
                        response,
                        path: entry.path.clone(),
                        scan_result: request.scan_result,
                    });
                }
                Err(e) if e.is_client_error() => {
                    warn!(status = ?e.status(), "Monitor request for {} rejected: {}", entry.path, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!(status = ?e.status(), "Could not monitor {}: {}", entry.path, e);
                    errors.push(EcosystemMonitorError {
                        error: e.to_string(),
                        path: entry.path.clone(),
                        scan_result: request.scan_result,
                    });
                }
            }
        }
    }

    Ok((results, errors))
}

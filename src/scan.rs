//! Runs a plugin's scan over every requested path.

use crate::error::Result;
use crate::model::ScanResult;
use crate::options::Options;
use crate::plugin::EcosystemPlugin;
use crate::progress::Progress;
use tracing::debug;

/// Scan results for one input path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathScanResults {
    pub path: String,
    pub scan_results: Vec<ScanResult>,
}

/// Scan results keyed by path, in input order.
pub type ScanResultsByPath = Vec<PathScanResults>;

/// Scans each path in order, one at a time.
///
/// Each call receives its own [`ScanOptions`](crate::options::ScanOptions)
/// for the path being scanned. The first plugin failure aborts the
/// remaining paths.
pub async fn scan_all(
    plugin: &dyn EcosystemPlugin,
    paths: &[String],
    options: &Options,
    progress: &Progress,
) -> Result<ScanResultsByPath> {
    let mut results = Vec::with_capacity(paths.len());

    for path in paths {
        progress.set_message(format!("Scanning {}...", path));
        debug!("Scanning {} with the {} plugin", path, plugin.ecosystem());

        let scan_results = plugin.scan(&options.for_path(path)).await?;
        results.push(PathScanResults {
            path: path.clone(),
            scan_results,
        });
    }

    Ok(results)
}

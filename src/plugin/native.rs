use crate::error::{Error, Result};
use crate::model::{Fact, GitTarget, Identity, ScanResult, ScanTarget, TestResult};
use crate::options::{Options, ScanOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::debug;
use walkdir::WalkDir;

use super::{display::render_test_report, Ecosystem};

pub const FINGERPRINTS_FACT: &str = "cpp-fingerprints";

const SOURCE_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp", "cxx", "c++", "h", "hh", "hpp", "hxx", "inl",
];

/// Scans unmanaged C/C++ source trees by fingerprinting their files.
pub struct NativePlugin;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fingerprint {
    pub file_path: String,
    pub hash: String,
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SOURCE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

/// Hashes every source file under `root`, sorted by relative path.
pub fn fingerprint_dir(root: &Path) -> Result<Vec<Fingerprint>> {
    let mut fingerprints = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_source_file(path) {
            continue;
        }

        let content = fs::read(path)?;
        let relative = path.strip_prefix(root).unwrap_or(path);
        fingerprints.push(Fingerprint {
            file_path: relative.to_string_lossy().replace('\\', "/"),
            hash: hex::encode(Sha256::digest(&content)),
        });
    }

    fingerprints.sort_by(|a, b| a.file_path.cmp(&b.file_path));
    Ok(fingerprints)
}

fn git_output(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// Best-effort git origin and branch for the scanned directory.
fn git_target(dir: &Path) -> Option<ScanTarget> {
    let remote_url = git_output(dir, &["config", "--get", "remote.origin.url"]);
    let branch = git_output(dir, &["rev-parse", "--abbrev-ref", "HEAD"]);
    if remote_url.is_none() && branch.is_none() {
        return None;
    }
    Some(ScanTarget::Git(GitTarget { remote_url, branch }))
}

fn project_name(dir: &Path) -> String {
    dir.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| dir.display().to_string())
}

fn fingerprint_count(scan_result: &ScanResult) -> Option<usize> {
    scan_result
        .fact(FINGERPRINTS_FACT)
        .and_then(|f| f.data.as_array())
        .map(|a| a.len())
}

/// Fingerprints one directory and tags it with its git origin. Blocking.
fn scan_dir(path: &str) -> Result<ScanResult> {
    let dir = Path::new(path);
    if !dir.is_dir() {
        return Err(Error::plugin(
            Ecosystem::Native,
            format!("{} is not a directory", path),
        ));
    }

    let fingerprints = fingerprint_dir(dir)?;
    if fingerprints.is_empty() {
        return Err(Error::plugin(
            Ecosystem::Native,
            format!("no source files found in {}", path),
        ));
    }
    debug!("Fingerprinted {} files in {}", fingerprints.len(), path);

    let mut result = ScanResult::new(
        Identity::new("cpp").with_arg("path", path),
        vec![Fact::new(FINGERPRINTS_FACT, serde_json::to_value(&fingerprints)?)],
    )
    .with_name(project_name(dir));

    if let Some(target) = git_target(dir) {
        result = result.with_target(target);
    }

    Ok(result)
}

#[async_trait]
impl super::EcosystemPlugin for NativePlugin {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Native
    }

    async fn scan(&self, options: &ScanOptions<'_>) -> Result<Vec<ScanResult>> {
        let path = options.path.to_string();
        let result = tokio::task::spawn_blocking(move || scan_dir(&path))
            .await
            .map_err(|e| Error::plugin(Ecosystem::Native, e.to_string()))??;

        Ok(vec![result])
    }

    async fn display(
        &self,
        scan_results: &[ScanResult],
        test_results: &[TestResult],
        errors: &[String],
        _options: &Options,
    ) -> Result<String> {
        Ok(render_test_report(scan_results, test_results, errors, |scan| {
            fingerprint_count(scan).map(|n| format!("  Fingerprinted {} source files", n))
        }))
    }
}

//! Command options consumed by the orchestrators and plugins.

/// Flags for a single `test` or `monitor` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Scan unmanaged source code with the native plugin.
    pub source: bool,
    /// Scan container images with the container plugin.
    pub container: bool,
    /// The caller is a desktop container integration, which is excluded
    /// from container ecosystem handling.
    pub is_docker_user: bool,
    /// Emit machine-readable JSON instead of the human report.
    pub json: bool,
    /// Per-invocation monitor project name.
    pub project_name: Option<String>,
}

impl Options {
    /// Builds the immutable view handed to a plugin for one path.
    pub fn for_path<'a>(&'a self, path: &'a str) -> ScanOptions<'a> {
        ScanOptions {
            path,
            options: self,
        }
    }
}

/// Options scoped to a single scanned path.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions<'a> {
    pub path: &'a str,
    pub options: &'a Options,
}

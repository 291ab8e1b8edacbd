//! Detection of other projects sharing a scanned directory.

use std::path::Path;
use walkdir::WalkDir;

/// Manifest files that mark a directory as a project.
const MANIFEST_FILES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Gemfile.lock",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "build.sbt",
    "requirements.txt",
    "Pipfile",
    "pyproject.toml",
    "poetry.lock",
    "setup.py",
    "go.mod",
    "Gopkg.lock",
    "vendor.json",
    "composer.lock",
    "Podfile",
    "packages.config",
    "project.json",
    "project.assets.json",
    "paket.dependencies",
    "Cargo.lock",
    "Package.swift",
    "mix.exs",
    "conanfile.txt",
    "conanfile.py",
    "vcpkg.json",
    "CMakeLists.txt",
];

/// Number of additional projects at `path` besides the one just scanned.
///
/// Looks only at the top level of the directory. Returns `None` when
/// `path` is not a directory or holds at most one manifest.
pub fn extra_projects_count(path: &Path) -> Option<usize> {
    if !path.is_dir() {
        return None;
    }

    let found = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|name| MANIFEST_FILES.contains(&name))
                .unwrap_or(false)
        })
        .count();

    (found > 1).then(|| found - 1)
}

//! Ecosystem plugins.
//!
//! This module provides the [`EcosystemPlugin`] trait, the pure
//! [`select_ecosystem`] decision function and the registry that maps an
//! [`Ecosystem`] to its implementation.
//!
//! # Available Plugins
//!
//! | Plugin | Ecosystem | Scans |
//! |--------|-----------|-------|
//! | [`NativePlugin`] | [`Ecosystem::Native`] | C/C++ source trees |
//! | [`ContainerPlugin`] | [`Ecosystem::Container`] | Container images |
//!
//! # Example
//!
//! ```no_run
//! use ecoscan::options::Options;
//! use ecoscan::plugin::{get_plugin, select_ecosystem};
//!
//! #[tokio::main]
//! async fn main() -> ecoscan::Result<()> {
//!     let options = Options { source: true, ..Default::default() };
//!     if let Some(ecosystem) = select_ecosystem(&options) {
//!         let plugin = get_plugin(ecosystem);
//!         let results = plugin.scan(&options.for_path(".")).await?;
//!         println!("{} scan results", results.len());
//!     }
//!     Ok(())
//! }
//! ```

mod container;
mod display;
mod native;

pub use container::ContainerPlugin;
pub use display::render_test_report;
pub use native::NativePlugin;

use crate::error::Result;
use crate::model::{ScanResult, TestResult};
use crate::options::{Options, ScanOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A category of scan target with its own plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// Unmanaged native source code (C/C++).
    Native,
    Container,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Native => "native",
            Ecosystem::Container => "container",
        }
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scans a path and renders test results for one ecosystem.
#[async_trait]
pub trait EcosystemPlugin: Send + Sync {
    fn ecosystem(&self) -> Ecosystem;

    /// Scans `options.path` and returns what was found there.
    ///
    /// # Errors
    ///
    /// A failure aborts the whole orchestration run.
    async fn scan(&self, options: &ScanOptions<'_>) -> Result<Vec<ScanResult>>;

    /// Renders scan results, their test results and soft errors for humans.
    async fn display(
        &self,
        scan_results: &[ScanResult],
        test_results: &[TestResult],
        errors: &[String],
        options: &Options,
    ) -> Result<String>;
}

/// Picks the ecosystem that handles these options.
///
/// Source scanning wins over container scanning. Desktop container users
/// get no ecosystem. `None` means the caller should fall back to
/// non-ecosystem behaviour; it is not an error.
pub fn select_ecosystem(options: &Options) -> Option<Ecosystem> {
    if options.source {
        return Some(Ecosystem::Native);
    }
    if options.container && !options.is_docker_user {
        return Some(Ecosystem::Container);
    }
    None
}

/// Returns the plugin for an ecosystem.
///
/// ```
/// use ecoscan::plugin::{get_plugin, Ecosystem};
///
/// assert_eq!(get_plugin(Ecosystem::Container).ecosystem(), Ecosystem::Container);
/// ```
pub fn get_plugin(ecosystem: Ecosystem) -> Box<dyn EcosystemPlugin> {
    match ecosystem {
        Ecosystem::Native => Box::new(NativePlugin),
        Ecosystem::Container => Box::new(ContainerPlugin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(source: bool, container: bool, is_docker_user: bool) -> Options {
        Options {
            source,
            container,
            is_docker_user,
            ..Default::default()
        }
    }

    #[test]
    fn test_source_always_selects_native() {
        for container in [false, true] {
            for docker_user in [false, true] {
                assert_eq!(
                    select_ecosystem(&options(true, container, docker_user)),
                    Some(Ecosystem::Native)
                );
            }
        }
    }

    #[test]
    fn test_container_selects_container() {
        assert_eq!(
            select_ecosystem(&options(false, true, false)),
            Some(Ecosystem::Container)
        );
    }

    #[test]
    fn test_docker_desktop_user_gets_no_ecosystem() {
        assert_eq!(select_ecosystem(&options(false, true, true)), None);
    }

    #[test]
    fn test_no_flags_no_ecosystem() {
        assert_eq!(select_ecosystem(&Options::default()), None);
        assert_eq!(select_ecosystem(&options(false, false, true)), None);
    }

    #[test]
    fn test_registry_returns_matching_plugin() {
        for ecosystem in [Ecosystem::Native, Ecosystem::Container] {
            assert_eq!(get_plugin(ecosystem).ecosystem(), ecosystem);
        }
    }
}

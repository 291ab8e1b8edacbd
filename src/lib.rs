pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod options;
pub mod orchestrator;
pub mod output;
pub mod plugin;
pub mod progress;
pub mod projects;
pub mod scan;

#[cfg(test)]
mod testing;

pub use api::{DependencyApi, HttpDependencyApi};
pub use config::Config;
pub use error::{Error, Result};
pub use model::{ScanResult, TestResult};
pub use options::Options;
pub use plugin::{select_ecosystem, Ecosystem, EcosystemPlugin};

//! Core data types exchanged between plugins and the remote service.
//!
//! - [`ScanResult`] - what a plugin found at a path, before testing
//! - [`TestResult`] - issues returned by the test endpoint
//! - [`MonitorDependenciesRequest`] / [`MonitorDependenciesResponse`] - monitor endpoint payloads
//! - [`EcosystemMonitorResult`] / [`EcosystemMonitorError`] - per scan result monitor outcomes
//!
//! Field names follow the remote service's camelCase wire format.
//!
//! # Example
//!
//! ```
//! use ecoscan::model::{Fact, Identity, ScanResult};
//!
//! let result = ScanResult::new(
//!     Identity::new("cpp"),
//!     vec![Fact::new("cpp-fingerprints", serde_json::json!([]))],
//! );
//! assert_eq!(result.facts.len(), 1);
//! ```

mod monitor;
mod scan;
mod test_result;

pub use monitor::*;
pub use scan::*;
pub use test_result::*;

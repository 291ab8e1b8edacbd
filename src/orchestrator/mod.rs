//! Test and monitor runs over scanned paths.
//!
//! Both orchestrators scan every path first, then submit each scan result
//! to the remote service in path order, then in scan-result order. Nothing
//! runs concurrently.
//!
//! Failure handling is the same for both:
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Plugin scan error | Run aborts |
//! | 4xx response | Run aborts with the server's message |
//! | 5xx or network error | Recorded for the path, run continues |

mod monitor;
mod test_runner;

pub use monitor::{
    filter_facts, monitor_all, monitor_all_with, monitor_dependencies, monitor_request,
    resolve_project_name,
};
pub use test_runner::{run_tests, run_tests_with, test_dependencies, TestCommandResult};

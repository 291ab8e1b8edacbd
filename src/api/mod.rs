//! Client for the remote dependency test and monitor service.
//!
//! Both endpoints require a bearer token and an `x-is-ci` header.
//!
//! | Endpoint | Method | Body | Response |
//! |----------|--------|------|----------|
//! | `/test-dependencies` | POST | [`ScanResult`] | [`TestResult`] |
//! | `/monitor-dependencies` | PUT | [`MonitorDependenciesRequest`] | [`MonitorDependenciesResponse`] |
//!
//! Non-success responses become [`Error::Api`](crate::Error::Api); callers
//! use [`Error::is_client_error`](crate::Error::is_client_error) to tell
//! fatal 4xx rejections from soft failures.

mod ci;
mod client;

pub use ci::is_ci;
pub use client::HttpDependencyApi;

use crate::error::Result;
use crate::model::{MonitorDependenciesRequest, MonitorDependenciesResponse, ScanResult, TestResult};
use async_trait::async_trait;

#[async_trait]
pub trait DependencyApi: Send + Sync {
    /// Submits a scan result for a one-off vulnerability test.
    async fn test_dependencies(&self, scan_result: &ScanResult) -> Result<TestResult>;

    /// Registers a scan result for ongoing monitoring.
    async fn monitor_dependencies(
        &self,
        request: &MonitorDependenciesRequest,
    ) -> Result<MonitorDependenciesResponse>;
}

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{MonitorDependenciesRequest, MonitorDependenciesResponse, ScanResult, TestResult};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::ci::is_ci;

/// [`DependencyApi`](super::DependencyApi) backed by the remote HTTP service.
pub struct HttpDependencyApi {
    client: Client,
    base_url: String,
    token: String,
    is_ci: bool,
}

/// Error body returned by the service on non-success responses.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    message: Option<String>,
    user_message: Option<String>,
    error: Option<String>,
}

impl HttpDependencyApi {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingToken`] when no token is configured and
    /// [`Error::Config`] when the API URL is not an http(s) URL.
    pub fn new(config: &Config) -> Result<Self> {
        let token = config.token.clone().ok_or(Error::MissingToken)?;
        if !config.api.starts_with("http://") && !config.api.starts_with("https://") {
            return Err(Error::Config(format!("invalid API URL: {}", config.api)));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("ecoscan/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api.trim_end_matches('/').to_string(),
            token,
            is_ci: is_ci(),
        })
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("x-is-ci", self.is_ci.to_string())
    }

    async fn send<B, T>(&self, method: Method, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(method, endpoint).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error = api_error(response).await;
            warn!("{} responded with {}: {}", endpoint, status, error);
            return Err(error);
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Converts a non-success response into [`Error::Api`].
async fn api_error(response: Response) -> Error {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    Error::Api {
        status: status.as_u16(),
        message: error_message(&text)
            .unwrap_or_else(|| format!("Request failed with status {}", status)),
    }
}

fn error_message(body: &str) -> Option<String> {
    let parsed: ApiErrorBody = serde_json::from_str(body).ok()?;
    parsed.message.or(parsed.user_message).or(parsed.error)
}

#[async_trait]
impl super::DependencyApi for HttpDependencyApi {
    async fn test_dependencies(&self, scan_result: &ScanResult) -> Result<TestResult> {
        self.send(Method::POST, "test-dependencies", scan_result).await
    }

    async fn monitor_dependencies(
        &self,
        request: &MonitorDependenciesRequest,
    ) -> Result<MonitorDependenciesResponse> {
        self.send(Method::PUT, "monitor-dependencies", request).await
    }
}

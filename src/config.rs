//! Configuration file handling.
//!
//! This module provides loading and saving of ecoscan configuration
//! from a TOML file, with environment variable overrides.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/ecoscan/config.toml`
//! - macOS: `~/Library/Application Support/ecoscan/config.toml`
//! - Windows: `%APPDATA%\ecoscan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! api = "https://api.ecoscan.io/v1"
//! app_url = "https://app.ecoscan.io"
//! token = "0f3c..."
//! project_name = "payments-service"
//! timeout_secs = 300
//! docker_desktop = false
//! ```
//!
//! # Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ECOSCAN_TOKEN` | `token` |
//! | `ECOSCAN_API` | `api` |
//! | `ECOSCAN_PROJECT_NAME` | `project_name` |
//! | `ECOSCAN_DOCKER_DESKTOP` | `docker_desktop` |

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_API: &str = "https://api.ecoscan.io/v1";
pub const DEFAULT_APP_URL: &str = "https://app.ecoscan.io";

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use ecoscan::Config;
///
/// let config = Config::load().unwrap();
/// println!("API: {}", config.api);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the remote test/monitor API.
    pub api: String,

    /// Root of the web application, used for project management links.
    pub app_url: String,

    /// API token sent as a bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Monitor project name used when `--project-name` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    /// HTTP request timeout in seconds.
    ///
    /// Default: 300
    pub timeout_secs: u64,

    /// Marks this machine as a desktop container integration.
    /// Container scanning is not handled for such callers.
    pub docker_desktop: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: DEFAULT_API.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            token: None,
            project_name: None,
            timeout_secs: 300,
            docker_desktop: false,
        }
    }
}

impl Config {
    /// Loads configuration from the config file and applies environment overrides.
    ///
    /// If the config file doesn't exist, defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overrides fields from environment variables, looked up through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty("ECOSCAN_TOKEN") {
            self.token = Some(token);
        }
        if let Some(api) = non_empty("ECOSCAN_API") {
            self.api = api;
        }
        if let Some(name) = non_empty("ECOSCAN_PROJECT_NAME") {
            self.project_name = Some(name);
        }
        if let Some(flag) = non_empty("ECOSCAN_DOCKER_DESKTOP") {
            self.docker_desktop = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// ```
    /// use ecoscan::Config;
    ///
    /// let path = Config::config_path();
    /// assert!(path.ends_with("ecoscan/config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ecoscan")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Copy safe to print: the token is masked down to its last four characters.
    pub fn redacted(&self) -> Self {
        let token = self.token.as_deref().map(|token| {
            let chars: Vec<char> = token.chars().collect();
            if chars.len() <= 8 {
                "****".to_string()
            } else {
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("****{}", tail)
            }
        });
        Self {
            token,
            ..self.clone()
        }
    }

    /// Effective configuration rendered as TOML, with the token redacted.
    pub fn display_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.redacted())?)
    }

    /// Link to the organisation's project management page.
    pub fn manage_url(&self, org: &str) -> String {
        format!("{}/org/{}/manage", self.app_url.trim_end_matches('/'), org)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.api, DEFAULT_API);
        assert_eq!(config.timeout_secs, 300);
        assert!(config.token.is_none());
        assert!(config.project_name.is_none());
        assert!(!config.docker_desktop);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("ECOSCAN_TOKEN", "secret"),
            ("ECOSCAN_API", "http://localhost:8000/api"),
            ("ECOSCAN_PROJECT_NAME", "global-name"),
            ("ECOSCAN_DOCKER_DESKTOP", "true"),
        ]));

        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.api, "http://localhost:8000/api");
        assert_eq!(config.project_name.as_deref(), Some("global-name"));
        assert!(config.docker_desktop);
    }

    #[test]
    fn test_empty_env_values_ignored() {
        let mut config = Config {
            token: Some("from-file".to_string()),
            ..Default::default()
        };
        config.apply_env(env(&[("ECOSCAN_TOKEN", "  ")]));
        assert_eq!(config.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("project_name = \"svc\"\n").unwrap();
        assert_eq!(config.project_name.as_deref(), Some("svc"));
        assert_eq!(config.api, DEFAULT_API);
        assert_eq!(config.timeout_secs, 300);
    }

    #[test]
    fn test_manage_url() {
        let config = Config {
            app_url: "https://app.example/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.manage_url("acme"), "https://app.example/org/acme/manage");
    }

    #[test]
    fn test_redacted_masks_token() {
        let config = Config {
            token: Some("0f3c9a7e-51d2-4b8e-a1c3-77e2d9b4c0aa".to_string()),
            project_name: Some("svc".to_string()),
            ..Default::default()
        };

        let redacted = config.redacted();
        assert_eq!(redacted.token.as_deref(), Some("****c0aa"));
        assert_eq!(redacted.project_name.as_deref(), Some("svc"));
        assert_eq!(redacted.api, config.api);

        let short = Config {
            token: Some("abc".to_string()),
            ..Default::default()
        };
        assert_eq!(short.redacted().token.as_deref(), Some("****"));
        assert_eq!(Config::default().redacted().token, None);
    }

    #[test]
    fn test_display_toml_shows_env_overrides_without_secret() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("ECOSCAN_TOKEN", "super-secret-token-1234"),
            ("ECOSCAN_API", "http://localhost:8000/api"),
        ]));

        let shown = config.display_toml().unwrap();
        assert!(shown.contains("http://localhost:8000/api"));
        assert!(shown.contains("****1234"));
        assert!(!shown.contains("super-secret"));
    }
}

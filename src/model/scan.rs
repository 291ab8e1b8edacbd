use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fact type carrying the container's `/etc/os-release` pretty name.
///
/// Never sent to the monitor endpoint.
pub const OS_RELEASE_FACT: &str = "imageOsReleasePrettyName";

/// What was scanned: a scan type tag plus free-form arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "type")]
    pub scan_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_file: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, String>,
}

impl Identity {
    pub fn new(scan_type: impl Into<String>) -> Self {
        Self {
            scan_type: scan_type.into(),
            target_file: None,
            args: BTreeMap::new(),
        }
    }

    pub fn with_target_file(mut self, target_file: impl Into<String>) -> Self {
        self.target_file = Some(target_file.into());
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// A typed, opaque unit of evidence attached to a scan result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    #[serde(rename = "type")]
    pub fact_type: String,
    pub data: serde_json::Value,
}

impl Fact {
    pub fn new(fact_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            fact_type: fact_type.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerTarget {
    pub image: String,
}

/// Where the scanned artifact came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScanTarget {
    Container(ContainerTarget),
    Git(GitTarget),
}

/// Output of a plugin scan for a single path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub identity: Identity,
    pub facts: Vec<Fact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ScanTarget>,
}

impl ScanResult {
    pub fn new(identity: Identity, facts: Vec<Fact>) -> Self {
        Self {
            identity,
            facts,
            name: None,
            policy: None,
            target: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_target(mut self, target: ScanTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn fact(&self, fact_type: &str) -> Option<&Fact> {
        self.facts.iter().find(|f| f.fact_type == fact_type)
    }

    /// Human-readable name of what was scanned.
    pub fn display_target(&self) -> String {
        if let Some(ScanTarget::Container(c)) = &self.target {
            return c.image.clone();
        }
        self.name
            .clone()
            .or_else(|| self.identity.target_file.clone())
            .unwrap_or_else(|| self.identity.scan_type.clone())
    }
}

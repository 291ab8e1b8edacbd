use crate::error::{Error, Result};
use crate::model::{
    ContainerTarget, Fact, Identity, ScanResult, ScanTarget, TestResult, OS_RELEASE_FACT,
};
use crate::options::{Options, ScanOptions};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::process::Command;
use tracing::{debug, warn};

use super::{display::render_test_report, Ecosystem};

/// Scans container images through the local docker CLI.
///
/// The scanned "path" is an image reference such as `alpine:3.19`.
pub struct ContainerPlugin;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ImageInspect {
    id: String,
    #[serde(default)]
    repo_tags: Vec<String>,
    #[serde(default)]
    os: Option<String>,
    #[serde(default)]
    architecture: Option<String>,
    #[serde(default, rename = "RootFS")]
    root_fs: Option<RootFs>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RootFs {
    #[serde(default)]
    layers: Vec<String>,
}

fn docker(args: &[&str]) -> Result<std::process::Output> {
    Command::new("docker").args(args).output().map_err(|e| {
        Error::plugin(
            Ecosystem::Container,
            format!("failed to execute docker. Is docker installed? ({})", e),
        )
    })
}

fn inspect_image(image: &str) -> Result<ImageInspect> {
    let output = docker(&["image", "inspect", image])?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::plugin(
            Ecosystem::Container,
            format!("could not inspect image {}: {}", image, stderr.trim()),
        ));
    }
    parse_inspect(&String::from_utf8_lossy(&output.stdout))
}

fn parse_inspect(stdout: &str) -> Result<ImageInspect> {
    let mut images: Vec<ImageInspect> = serde_json::from_str(stdout)?;
    if images.is_empty() {
        return Err(Error::plugin(
            Ecosystem::Container,
            "docker image inspect returned no images",
        ));
    }
    Ok(images.swap_remove(0))
}

/// Reads `/etc/os-release` from the image. Distroless images have none.
fn os_release(image: &str) -> Option<String> {
    let output = docker(&[
        "run",
        "--rm",
        "--entrypoint",
        "cat",
        image,
        "/etc/os-release",
    ])
    .ok()?;
    if !output.status.success() {
        debug!("No os-release in {}", image);
        return None;
    }
    parse_pretty_name(&String::from_utf8_lossy(&output.stdout))
}

fn parse_pretty_name(os_release: &str) -> Option<String> {
    os_release.lines().find_map(|line| {
        let value = line.trim().strip_prefix("PRETTY_NAME=")?;
        let value = value.trim_matches(|c| c == '"' || c == '\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn image_facts(image: &ImageInspect, pretty_name: Option<String>) -> Vec<Fact> {
    let mut facts = vec![
        Fact::new("imageId", json!(image.id)),
        Fact::new(
            "imageLayers",
            json!(image
                .root_fs
                .as_ref()
                .map(|fs| fs.layers.clone())
                .unwrap_or_default()),
        ),
        Fact::new("imageNames", json!({ "names": image.repo_tags })),
    ];

    if let (Some(os), Some(arch)) = (&image.os, &image.architecture) {
        facts.push(Fact::new("imagePlatform", json!(format!("{}/{}", os, arch))));
    }
    if let Some(name) = pretty_name {
        facts.push(Fact::new(OS_RELEASE_FACT, json!(name)));
    }

    facts
}

#[async_trait]
impl super::EcosystemPlugin for ContainerPlugin {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Container
    }

    async fn scan(&self, options: &ScanOptions<'_>) -> Result<Vec<ScanResult>> {
        let image = options.path.to_string();

        let (inspect, pretty_name) = tokio::task::spawn_blocking({
            let image = image.clone();
            move || -> Result<_> {
                let inspect = inspect_image(&image)?;
                Ok((inspect, os_release(&image)))
            }
        })
        .await
        .map_err(|e| Error::plugin(Ecosystem::Container, e.to_string()))??;

        if pretty_name.is_none() {
            warn!("Could not determine the OS release of {}", image);
        }

        let mut identity = Identity::new("docker");
        if let Some(platform) = inspect
            .os
            .as_ref()
            .zip(inspect.architecture.as_ref())
            .map(|(os, arch)| format!("{}/{}", os, arch))
        {
            identity = identity.with_arg("platform", platform);
        }

        let result = ScanResult::new(identity, image_facts(&inspect, pretty_name))
            .with_name(image.clone())
            .with_target(ScanTarget::Container(ContainerTarget { image }));

        Ok(vec![result])
    }

    async fn display(
        &self,
        scan_results: &[ScanResult],
        test_results: &[TestResult],
        errors: &[String],
        _options: &Options,
    ) -> Result<String> {
        Ok(render_test_report(scan_results, test_results, errors, |scan| {
            let os = scan.fact(OS_RELEASE_FACT)?.data.as_str()?;
            Some(format!("  Base OS: {}", os))
        }))
    }
}

//! Availability zone lookup through the provider CLIs

use crate::error::{Result, TerraformError};
use async_trait::async_trait;
use bbl_core::{CommandRunner, Invocation};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

#[async_trait]
pub trait ZoneRetriever: Send + Sync {
    async fn zones(&self, region: &str) -> Result<Vec<String>>;
}

/// `aws ec2 describe-availability-zones`
pub struct AwsCliZones {
    runner: Arc<dyn CommandRunner>,
    aws_path: PathBuf,
    access_key_id: String,
    secret_access_key: String,
}

#[derive(Debug, Deserialize)]
struct AwsZoneList {
    #[serde(rename = "AvailabilityZones", default)]
    availability_zones: Vec<AwsZone>,
}

#[derive(Debug, Deserialize)]
struct AwsZone {
    #[serde(rename = "ZoneName")]
    zone_name: String,
    #[serde(rename = "State", default)]
    state: String,
}

impl AwsCliZones {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            aws_path: PathBuf::from("aws"),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.aws_path = path.into();
        self
    }
}

#[async_trait]
impl ZoneRetriever for AwsCliZones {
    async fn zones(&self, region: &str) -> Result<Vec<String>> {
        let invocation = Invocation::new(&self.aws_path)
            .args([
                "ec2",
                "describe-availability-zones",
                "--region",
                region,
                "--output",
                "json",
            ])
            .env("AWS_ACCESS_KEY_ID", &self.access_key_id)
            .env("AWS_SECRET_ACCESS_KEY", &self.secret_access_key);

        let stdout = run(self.runner.as_ref(), &invocation, "aws").await?;
        let list: AwsZoneList = serde_json::from_str(&stdout)?;

        Ok(list
            .availability_zones
            .into_iter()
            .filter(|z| z.state.is_empty() || z.state == "available")
            .map(|z| z.zone_name)
            .collect())
    }
}

/// `gcloud compute zones list`
pub struct GcloudZones {
    runner: Arc<dyn CommandRunner>,
    gcloud_path: PathBuf,
    project_id: String,
    credentials_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct GcloudZone {
    name: String,
    #[serde(default)]
    status: String,
}

impl GcloudZones {
    pub fn new(runner: Arc<dyn CommandRunner>, project_id: impl Into<String>) -> Self {
        Self {
            runner,
            gcloud_path: PathBuf::from("gcloud"),
            project_id: project_id.into(),
            credentials_file: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.gcloud_path = path.into();
        self
    }

    /// Authenticate with a service account key file instead of the active gcloud account
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }
}

#[async_trait]
impl ZoneRetriever for GcloudZones {
    async fn zones(&self, region: &str) -> Result<Vec<String>> {
        let mut invocation = Invocation::new(&self.gcloud_path).args([
            "compute".to_string(),
            "zones".to_string(),
            "list".to_string(),
            format!("--filter=region:{}", region),
            format!("--project={}", self.project_id),
            "--format=json".to_string(),
        ]);
        if let Some(file) = &self.credentials_file {
            invocation = invocation.env(
                "CLOUDSDK_AUTH_CREDENTIAL_FILE_OVERRIDE",
                file.display().to_string(),
            );
        }

        let stdout = run(self.runner.as_ref(), &invocation, "gcloud").await?;
        let zones: Vec<GcloudZone> = serde_json::from_str(&stdout)?;

        let mut names: Vec<String> = zones
            .into_iter()
            .filter(|z| z.status.is_empty() || z.status == "UP")
            .map(|z| z.name)
            .collect();
        names.sort();
        Ok(names)
    }
}

async fn run(runner: &dyn CommandRunner, invocation: &Invocation, tool: &str) -> Result<String> {
    let output = runner.run(invocation).await?;
    if !output.success() {
        return Err(TerraformError::ZonesUnavailable(format!(
            "{} {}: {}",
            tool,
            output.status_text(),
            output.stderr.trim()
        )));
    }
    Ok(output.stdout)
}

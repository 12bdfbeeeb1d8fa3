//! Drives the terraform binary
//!
//! Every run lays out the same files before invoking terraform:
//!
//! - `terraform/template.tf`
//! - `vars/terraform.tfvars.json`
//! - `vars/terraform.tfstate` (the state carried in `bbl-state.json`)

use crate::error::{Result, TerraformError};
use crate::generator::Inputs;
use crate::outputs::Outputs;
use async_trait::async_trait;
use bbl_core::{CommandRunner, FileIo, Invocation, StateStore};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use thiserror::Error;

pub const TEMPLATE_FILE: &str = "template.tf";
pub const TFVARS_FILE: &str = "terraform.tfvars.json";
pub const TFSTATE_FILE: &str = "terraform.tfstate";

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v?(\d+\.\d+\.\d+)").expect("valid version pattern"));

/// Result of a successful apply/destroy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutput {
    pub tf_state: String,
    /// Combined stdout and stderr of every terraform call in the run
    pub output: String,
}

/// A failed apply/destroy together with whatever terraform printed
#[derive(Error, Debug)]
#[error("{source}")]
pub struct ExecutorError {
    pub source: TerraformError,
    pub output: String,
}

#[async_trait]
pub trait TerraformExecutor: Send + Sync {
    async fn apply(
        &self,
        inputs: &Inputs,
        template: &str,
        tf_state: &str,
    ) -> std::result::Result<RunOutput, ExecutorError>;

    async fn destroy(
        &self,
        inputs: &Inputs,
        template: &str,
        tf_state: &str,
    ) -> std::result::Result<RunOutput, ExecutorError>;

    async fn outputs(&self, tf_state: &str) -> Result<Outputs>;

    async fn version(&self) -> Result<String>;
}

struct Layout {
    terraform_dir: PathBuf,
    tfvars: PathBuf,
    tfstate: PathBuf,
}

pub struct Executor {
    runner: Arc<dyn CommandRunner>,
    store: Arc<dyn StateStore>,
    fs: Arc<dyn FileIo>,
    terraform_path: PathBuf,
}

impl Executor {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        store: Arc<dyn StateStore>,
        fs: Arc<dyn FileIo>,
    ) -> Self {
        Self {
            runner,
            store,
            fs,
            terraform_path: PathBuf::from("terraform"),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.terraform_path = path.into();
        self
    }

    async fn layout(&self) -> Result<Layout> {
        let terraform_dir = self.store.terraform_dir().await?;
        let vars_dir = self.store.vars_dir().await?;
        Ok(Layout {
            terraform_dir,
            tfvars: vars_dir.join(TFVARS_FILE),
            tfstate: vars_dir.join(TFSTATE_FILE),
        })
    }

    async fn write_tf_state(&self, path: &Path, tf_state: &str) -> Result<()> {
        if tf_state.is_empty() {
            // A stale file from an earlier environment would be picked up as-is
            if self.fs.exists(path).await {
                self.fs.remove_file(path).await?;
            }
            return Ok(());
        }
        self.fs.write(path, tf_state.as_bytes(), 0o600).await?;
        Ok(())
    }

    async fn prepare(&self, inputs: &Inputs, template: &str, tf_state: &str) -> Result<Layout> {
        let layout = self.layout().await?;

        self.fs
            .write(
                &layout.terraform_dir.join(TEMPLATE_FILE),
                template.as_bytes(),
                0o644,
            )
            .await?;

        let tfvars = serde_json::to_vec_pretty(inputs)?;
        self.fs.write(&layout.tfvars, &tfvars, 0o600).await?;

        self.write_tf_state(&layout.tfstate, tf_state).await?;

        Ok(layout)
    }

    async fn terraform(&self, operation: &str, args: Vec<String>, dir: &Path, log: &mut String) -> Result<String> {
        let invocation = Invocation::new(&self.terraform_path)
            .args(args)
            .current_dir(dir);

        tracing::debug!("Running: {}", invocation.display());

        let output = self.runner.run(&invocation).await?;
        log.push_str(&output.combined());

        if !output.success() {
            return Err(TerraformError::CommandFailed {
                operation: operation.to_string(),
                status: output.status_text(),
            });
        }
        Ok(output.stdout)
    }

    async fn try_run(
        &self,
        command: &str,
        inputs: &Inputs,
        template: &str,
        tf_state: &str,
        log: &mut String,
    ) -> Result<String> {
        let layout = self.prepare(inputs, template, tf_state).await?;

        self.terraform("init", vec!["init".into()], &layout.terraform_dir, log)
            .await?;

        let args = vec![
            command.to_string(),
            "-auto-approve".to_string(),
            format!("-state={}", layout.tfstate.display()),
            format!("-var-file={}", layout.tfvars.display()),
        ];
        self.terraform(command, args, &layout.terraform_dir, log)
            .await?;

        if !self.fs.exists(&layout.tfstate).await {
            return Ok(String::new());
        }
        Ok(self.fs.read_to_string(&layout.tfstate).await?)
    }

    async fn run(
        &self,
        command: &str,
        inputs: &Inputs,
        template: &str,
        tf_state: &str,
    ) -> std::result::Result<RunOutput, ExecutorError> {
        let mut output = String::new();
        match self
            .try_run(command, inputs, template, tf_state, &mut output)
            .await
        {
            Ok(tf_state) => Ok(RunOutput { tf_state, output }),
            Err(source) => Err(ExecutorError { source, output }),
        }
    }
}

#[async_trait]
impl TerraformExecutor for Executor {
    async fn apply(
        &self,
        inputs: &Inputs,
        template: &str,
        tf_state: &str,
    ) -> std::result::Result<RunOutput, ExecutorError> {
        self.run("apply", inputs, template, tf_state).await
    }

    async fn destroy(
        &self,
        inputs: &Inputs,
        template: &str,
        tf_state: &str,
    ) -> std::result::Result<RunOutput, ExecutorError> {
        self.run("destroy", inputs, template, tf_state).await
    }

    async fn outputs(&self, tf_state: &str) -> Result<Outputs> {
        let layout = self.layout().await?;
        self.write_tf_state(&layout.tfstate, tf_state).await?;

        let mut log = String::new();
        let stdout = self
            .terraform(
                "output",
                vec![
                    "output".into(),
                    "-json".into(),
                    format!("-state={}", layout.tfstate.display()),
                ],
                &layout.terraform_dir,
                &mut log,
            )
            .await?;

        Outputs::from_terraform_json(&stdout)
    }

    async fn version(&self) -> Result<String> {
        let output = self
            .runner
            .run(&Invocation::new(&self.terraform_path).arg("version"))
            .await?;
        if !output.success() {
            return Err(TerraformError::CommandFailed {
                operation: "version".into(),
                status: output.status_text(),
            });
        }
        parse_version(&output.stdout)
    }
}

/// Pull `X.Y.Z` out of `Terraform v0.12.31 ...`
pub fn parse_version(text: &str) -> Result<String> {
    let first_line = text.lines().next().unwrap_or_default();
    VERSION_PATTERN
        .captures(first_line)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| TerraformError::VersionParse(first_line.to_string()))
}

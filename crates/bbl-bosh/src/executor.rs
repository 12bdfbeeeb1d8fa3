//! bosh create-env / delete-env through generated shell scripts
//!
//! The scripts are written into the state directory once and never
//! overwritten, so operators can edit them. Every path inside them is
//! relative to `${BBL_STATE_DIR}`, which is set only in the environment of
//! the script process.

use crate::error::{BoshError, BoshVersionError, Result};
use async_trait::async_trait;
use bbl_core::{CommandRunner, FileIo, Iaas, Invocation, StateStore};
use regex::Regex;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

pub const STATE_DIR_VAR: &str = "BBL_STATE_DIR";
pub const USER_OPS_FILE: &str = "user-ops-file.yml";

const SCRIPT_MODE: u32 = 0o755;
const VARS_MODE: u32 = 0o600;

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+").expect("valid version pattern"));

/// The two environments bbl creates with `bosh create-env`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    Jumpbox,
    Director,
}

impl Deployment {
    pub fn name(&self) -> &'static str {
        match self {
            Deployment::Jumpbox => "jumpbox",
            Deployment::Director => "director",
        }
    }

    /// Directory (under the state dir) holding the deployment manifests
    pub fn deployment_dir(&self) -> &'static str {
        match self {
            Deployment::Jumpbox => "jumpbox-deployment",
            Deployment::Director => "bosh-deployment",
        }
    }

    pub fn manifest(&self) -> &'static str {
        match self {
            Deployment::Jumpbox => "jumpbox.yml",
            Deployment::Director => "bosh.yml",
        }
    }

    pub fn state_file(&self) -> &'static str {
        match self {
            Deployment::Jumpbox => "jumpbox-state.json",
            Deployment::Director => "bosh-state.json",
        }
    }

    pub fn vars_store_file(&self) -> String {
        format!("{}-variables.yml", self.name())
    }

    pub fn deployment_vars_file(&self) -> String {
        format!("{}-deployment-vars.yml", self.name())
    }

    pub fn create_script(&self) -> String {
        format!("create-{}.sh", self.name())
    }

    pub fn delete_script(&self) -> String {
        format!("delete-{}.sh", self.name())
    }

    /// Ops files applied on top of the base manifest, relative to the deployment dir
    fn ops_files(&self, iaas: Iaas) -> Vec<String> {
        let cpi = format!("{}/cpi.yml", iaas);
        match self {
            Deployment::Jumpbox => vec![cpi],
            Deployment::Director => {
                let mut ops = vec![cpi];
                if iaas == Iaas::Aws {
                    ops.push("aws/iam-instance-profile.yml".into());
                    ops.push("aws/encrypted-disk.yml".into());
                }
                ops.extend(
                    ["jumpbox-user.yml", "uaa.yml", "credhub.yml"]
                        .into_iter()
                        .map(String::from),
                );
                if iaas == Iaas::Gcp {
                    ops.push("gcp/bosh-director-ephemeral-ip-ops.yml".into());
                }
                ops
            }
        }
    }
}

/// Everything needed to lay out a deployment before create-env
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolateInput {
    pub deployment: Deployment,
    pub iaas: Iaas,
    /// YAML passed with `--vars-file`
    pub deployment_vars: String,
    /// Previous vars-store contents
    pub variables: String,
    /// Previous create-env state
    pub state: Map<String, Value>,
    /// User supplied ops file contents; director only
    pub ops_file: String,
}

/// What create-env left behind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateEnvOutput {
    pub variables: String,
    pub state: Map<String, Value>,
}

#[async_trait]
pub trait BoshExecutor: Send + Sync {
    /// Write vars files and the create/delete scripts for a deployment
    async fn create_env_args(&self, input: &InterpolateInput) -> Result<()>;

    async fn create_env(&self, deployment: Deployment) -> Result<CreateEnvOutput>;

    async fn delete_env(&self, deployment: Deployment) -> Result<()>;

    async fn version(&self) -> Result<String>;
}

pub struct Executor {
    runner: Arc<dyn CommandRunner>,
    store: Arc<dyn StateStore>,
    fs: Arc<dyn FileIo>,
    bosh_path: PathBuf,
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
            bosh_path: PathBuf::from("bosh"),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.bosh_path = path.into();
        self
    }

    fn args(&self, input: &InterpolateInput) -> Vec<String> {
        let deployment = input.deployment;
        let deployment_dir = format!("${{{}}}/{}", STATE_DIR_VAR, deployment.deployment_dir());
        let vars_dir = format!("${{{}}}/vars", STATE_DIR_VAR);

        let mut args = vec![
            format!("{}/{}", deployment_dir, deployment.manifest()),
            "--state".to_string(),
            format!("{}/{}", vars_dir, deployment.state_file()),
            "--vars-store".to_string(),
            format!("{}/{}", vars_dir, deployment.vars_store_file()),
            "--vars-file".to_string(),
            format!("{}/{}", vars_dir, deployment.deployment_vars_file()),
        ];

        for ops in deployment.ops_files(input.iaas) {
            args.push("-o".to_string());
            args.push(format!("{}/{}", deployment_dir, ops));
        }

        if deployment == Deployment::Director && !input.ops_file.is_empty() {
            args.push("-o".to_string());
            args.push(format!("{}/{}", vars_dir, USER_OPS_FILE));
        }

        args
    }

    async fn write_script(&self, path: &Path, contents: &str) -> Result<()> {
        if self.fs.exists(path).await {
            tracing::debug!("Keeping existing script {}", path.display());
            return Ok(());
        }
        self.fs.write(path, contents.as_bytes(), SCRIPT_MODE).await?;
        Ok(())
    }

    async fn run_script(&self, script: String, command: &str) -> Result<()> {
        let state_dir = self.store.state_dir();
        let invocation = Invocation::new(state_dir.join(script))
            .current_dir(state_dir)
            .env(STATE_DIR_VAR, state_dir.display().to_string());

        tracing::debug!("Running: {}", invocation.display());

        let output = self.runner.run(&invocation).await?;
        if !output.stdout.is_empty() || !output.stderr.is_empty() {
            tracing::debug!("{}", output.combined());
        }

        if !output.success() {
            return Err(BoshError::CommandFailed {
                command: command.to_string(),
                status: output.status_text(),
            });
        }
        Ok(())
    }

    async fn read_if_exists(&self, path: &Path) -> Result<String> {
        if !self.fs.exists(path).await {
            return Ok(String::new());
        }
        Ok(self.fs.read_to_string(path).await?)
    }
}

#[async_trait]
impl BoshExecutor for Executor {
    async fn create_env_args(&self, input: &InterpolateInput) -> Result<()> {
        let deployment = input.deployment;
        let vars_dir = self.store.vars_dir().await?;
        self.store.deployment_dir(deployment.deployment_dir()).await?;

        self.fs
            .write(
                &vars_dir.join(deployment.deployment_vars_file()),
                input.deployment_vars.as_bytes(),
                VARS_MODE,
            )
            .await?;

        if !input.variables.is_empty() {
            self.fs
                .write(
                    &vars_dir.join(deployment.vars_store_file()),
                    input.variables.as_bytes(),
                    VARS_MODE,
                )
                .await?;
        }

        if !input.state.is_empty() {
            let state = serde_json::to_vec(&input.state)?;
            self.fs
                .write(&vars_dir.join(deployment.state_file()), &state, VARS_MODE)
                .await?;
        }

        if deployment == Deployment::Director && !input.ops_file.is_empty() {
            self.fs
                .write(
                    &vars_dir.join(USER_OPS_FILE),
                    input.ops_file.as_bytes(),
                    VARS_MODE,
                )
                .await?;
        }

        let args = self.args(input);
        let state_dir = self.store.state_dir();
        let bosh = self.bosh_path.display().to_string();

        self.write_script(
            &state_dir.join(deployment.create_script()),
            &format_script(&bosh, "create-env", &args),
        )
        .await?;
        self.write_script(
            &state_dir.join(deployment.delete_script()),
            &format_script(&bosh, "delete-env", &args),
        )
        .await?;

        Ok(())
    }

    async fn create_env(&self, deployment: Deployment) -> Result<CreateEnvOutput> {
        self.run_script(deployment.create_script(), "create-env")
            .await?;

        let vars_dir = self.store.vars_dir().await?;
        let variables = self
            .read_if_exists(&vars_dir.join(deployment.vars_store_file()))
            .await?;

        let raw_state = self
            .read_if_exists(&vars_dir.join(deployment.state_file()))
            .await?;
        let state = if raw_state.trim().is_empty() {
            Map::new()
        } else {
            serde_json::from_str(&raw_state)?
        };

        Ok(CreateEnvOutput { variables, state })
    }

    async fn delete_env(&self, deployment: Deployment) -> Result<()> {
        self.run_script(deployment.delete_script(), "delete-env")
            .await
    }

    async fn version(&self) -> Result<String> {
        let invocation = Invocation::new(&self.bosh_path).arg("-v");
        tracing::debug!("Running: {}", invocation.display());

        let output = self.runner.run(&invocation).await?;
        if !output.success() {
            return Err(BoshError::CommandFailed {
                command: "-v".into(),
                status: output.status_text(),
            });
        }

        parse_version(&output.stdout)
    }
}

/// Render a `#!/bin/sh` script running `bosh <command>` with one argument
/// per continuation line; flags share their line with the value after them.
pub fn format_script(bosh_path: &str, command: &str, args: &[String]) -> String {
    let mut script = format!("#!/bin/sh\n{} {} \\\n", bosh_path, command);
    for arg in args {
        if arg.starts_with('-') {
            script.push_str("  ");
            script.push_str(arg);
        } else {
            script.push_str("  ");
            script.push_str(arg);
            script.push_str(" \\\n");
        }
    }
    script.truncate(script.len() - 2);
    script.push('\n');
    script
}

pub fn parse_version(text: &str) -> Result<String> {
    VERSION_PATTERN
        .find(text)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| BoshVersionError::new("BOSH version could not be parsed").into())
}

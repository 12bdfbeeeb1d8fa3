//! Collaborator wiring for one invocation
//!
//! The IaaS is resolved once here into the terraform generators, zone
//! retriever and cloud-config ops generator for that provider.

use crate::config::GlobalArgs;
use anyhow::Context;
use bbl_bosh::{CliClientProvider, DeploymentSources};
use bbl_cloudconfig::{AwsOpsGenerator, AzureOpsGenerator, GcpOpsGenerator, OpsGenerator};
use bbl_core::{
    CommandRunner, ConsoleLogger, FileIo, Iaas, LocalFs, ProcessRunner, State, StateStore,
    StepLogger, Store,
};
use bbl_terraform::aws::{AwsInputGenerator, AwsTemplateGenerator};
use bbl_terraform::azure::{AzureInputGenerator, AzureTemplateGenerator};
use bbl_terraform::gcp::{CREDENTIALS_FILE, GcpInputGenerator, GcpTemplateGenerator};
use bbl_terraform::{
    AwsCliZones, GcloudZones, InputGenerator, ManagerError, TemplateGenerator, ZoneRetriever,
};
use std::path::PathBuf;
use std::sync::Arc;

pub struct App {
    pub iaas: Iaas,
    pub store: Arc<Store>,
    pub logger: Arc<dyn StepLogger>,
    pub fs: Arc<dyn FileIo>,
    pub terraform: Arc<bbl_terraform::Manager>,
    pub bosh: bbl_bosh::Manager,
    pub cloud_config: bbl_cloudconfig::Manager,
    zones: Option<Arc<dyn ZoneRetriever>>,
}

impl App {
    pub fn new(iaas: Iaas, state: &State, args: &GlobalArgs) -> Self {
        let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner);
        let fs: Arc<dyn FileIo> = Arc::new(LocalFs);
        let logger: Arc<dyn StepLogger> = Arc::new(ConsoleLogger);
        let store = Arc::new(Store::new(&args.state_dir));
        let state_store: Arc<dyn StateStore> = store.clone();

        let terraform_for = |templates: Arc<dyn TemplateGenerator>,
                             inputs: Arc<dyn InputGenerator>| {
            let executor =
                bbl_terraform::Executor::new(runner.clone(), state_store.clone(), fs.clone())
                    .with_path(&args.terraform_path);
            Arc::new(bbl_terraform::Manager::new(
                Arc::new(executor),
                templates,
                inputs,
                logger.clone(),
            ))
        };

        let (zones, terraform, ops): (
            Option<Arc<dyn ZoneRetriever>>,
            Arc<bbl_terraform::Manager>,
            Arc<dyn OpsGenerator>,
        ) = match iaas {
            Iaas::Aws => {
                let zones: Arc<dyn ZoneRetriever> = Arc::new(AwsCliZones::new(
                    runner.clone(),
                    state.aws.access_key_id.clone(),
                    state.aws.secret_access_key.clone(),
                ));
                let inputs = AwsInputGenerator::new(zones.clone(), state_store.clone(), fs.clone());
                let terraform = terraform_for(Arc::new(AwsTemplateGenerator), Arc::new(inputs));
                let ops: Arc<dyn OpsGenerator> =
                    Arc::new(AwsOpsGenerator::new(terraform.clone(), zones.clone()));
                (Some(zones), terraform, ops)
            }
            Iaas::Gcp => {
                let zones: Arc<dyn ZoneRetriever> = Arc::new(
                    GcloudZones::new(runner.clone(), state.gcp.project_id.clone())
                        .with_credentials_file(gcp_credentials_path(args)),
                );
                let inputs = GcpInputGenerator::new(zones.clone(), state_store.clone(), fs.clone());
                let terraform = terraform_for(Arc::new(GcpTemplateGenerator), Arc::new(inputs));
                let ops: Arc<dyn OpsGenerator> =
                    Arc::new(GcpOpsGenerator::new(terraform.clone()));
                (Some(zones), terraform, ops)
            }
            Iaas::Azure => {
                let terraform =
                    terraform_for(Arc::new(AzureTemplateGenerator), Arc::new(AzureInputGenerator));
                let ops: Arc<dyn OpsGenerator> =
                    Arc::new(AzureOpsGenerator::new(terraform.clone()));
                (None, terraform, ops)
            }
        };

        let bosh_executor =
            bbl_bosh::Executor::new(runner.clone(), state_store.clone(), fs.clone())
                .with_path(&args.bosh_path);
        let bosh = bbl_bosh::Manager::new(
            Arc::new(bosh_executor),
            terraform.clone(),
            state_store.clone(),
            logger.clone(),
            iaas,
        )
        .with_sources(DeploymentSources {
            jumpbox: args.jumpbox_deployment_source.clone(),
            director: args.bosh_deployment_source.clone(),
        });

        let clients = Arc::new(CliClientProvider::new(runner.clone(), &args.bosh_path));
        let cloud_config = bbl_cloudconfig::Manager::new(
            runner,
            state_store,
            fs.clone(),
            ops,
            clients,
            logger.clone(),
        )
        .with_bosh_path(&args.bosh_path);

        Self {
            iaas,
            store,
            logger,
            fs,
            terraform,
            bosh,
            cloud_config,
            zones,
        }
    }

    pub async fn save(&self, state: &State) -> anyhow::Result<()> {
        self.store.set(state).await.context("Save state")
    }

    /// Apply terraform, persisting the captured output even when it fails
    pub async fn apply_terraform(&self, state: State) -> anyhow::Result<State> {
        match self.terraform.apply(state).await {
            Ok(state) => Ok(state),
            Err(e) => Err(self.persist_failure(e).await),
        }
    }

    pub async fn destroy_terraform(&self, state: State) -> anyhow::Result<State> {
        match self.terraform.destroy(state).await {
            Ok(state) => Ok(state),
            Err(e) => Err(self.persist_failure(e).await),
        }
    }

    async fn persist_failure(&self, error: ManagerError) -> anyhow::Error {
        let (state, source) = error.into_parts();
        if let Err(save) = self.store.set(&state).await {
            tracing::warn!("Could not save state after terraform failure: {}", save);
        }
        anyhow::Error::new(source)
    }

    /// Record the GCP zones in the state so cloud-config can read them back
    pub async fn prepare_zones(&self, mut state: State) -> anyhow::Result<State> {
        let (Iaas::Gcp, Some(zones)) = (self.iaas, &self.zones) else {
            return Ok(state);
        };

        let vars_dir = self.store.vars_dir().await?;
        self.fs
            .write(
                &vars_dir.join(CREDENTIALS_FILE),
                state.gcp.service_account_key.as_bytes(),
                0o600,
            )
            .await
            .context("Write GCP credentials")?;

        let found = zones
            .zones(&state.gcp.region)
            .await
            .context("Retrieve GCP zones")?;
        if state.gcp.zone.is_empty() {
            state.gcp.zone = found.first().cloned().unwrap_or_default();
        }
        state.gcp.zones = found;
        Ok(state)
    }
}

fn gcp_credentials_path(args: &GlobalArgs) -> PathBuf {
    args.state_dir.join("vars").join(CREDENTIALS_FILE)
}

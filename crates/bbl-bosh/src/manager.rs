//! Jumpbox and director lifecycle

use crate::deployment_vars::{deployment_vars, director_name};
use crate::error::{BoshError, Result};
use crate::executor::{BoshExecutor, Deployment, InterpolateInput};
use crate::sources::copy_without_clobber;
use crate::vars::{self, DIRECTOR_USERNAME};
use bbl_core::{Bosh, Iaas, Jumpbox, State, StateStore, StepLogger};
use bbl_terraform::OutputsProvider;
use semver::Version;
use std::path::PathBuf;
use std::sync::Arc;

pub const MINIMUM_VERSION: &str = "2.0.24";

/// Optional local checkouts of jumpbox-deployment / bosh-deployment
#[derive(Debug, Clone, Default)]
pub struct DeploymentSources {
    pub jumpbox: Option<PathBuf>,
    pub director: Option<PathBuf>,
}

impl DeploymentSources {
    fn for_deployment(&self, deployment: Deployment) -> Option<&PathBuf> {
        match deployment {
            Deployment::Jumpbox => self.jumpbox.as_ref(),
            Deployment::Director => self.director.as_ref(),
        }
    }
}

pub struct Manager {
    executor: Arc<dyn BoshExecutor>,
    outputs: Arc<dyn OutputsProvider>,
    store: Arc<dyn StateStore>,
    logger: Arc<dyn StepLogger>,
    iaas: Iaas,
    sources: DeploymentSources,
}

impl Manager {
    pub fn new(
        executor: Arc<dyn BoshExecutor>,
        outputs: Arc<dyn OutputsProvider>,
        store: Arc<dyn StateStore>,
        logger: Arc<dyn StepLogger>,
        iaas: Iaas,
    ) -> Self {
        Self {
            executor,
            outputs,
            store,
            logger,
            iaas,
            sources: DeploymentSources::default(),
        }
    }

    pub fn with_sources(mut self, sources: DeploymentSources) -> Self {
        self.sources = sources;
        self
    }

    pub async fn version(&self) -> Result<String> {
        self.executor.version().await
    }

    /// Fail unless the installed bosh CLI supports everything bbl passes it
    pub async fn validate_version(&self) -> Result<()> {
        let found = self.version().await?;
        let parsed = Version::parse(&found)
            .map_err(|e| crate::error::BoshVersionError::new(e.to_string()))?;
        let minimum = Version::new(2, 0, 24);
        if parsed < minimum {
            return Err(BoshError::VersionTooOld {
                found,
                minimum: MINIMUM_VERSION.to_string(),
            });
        }
        Ok(())
    }

    async fn seed_deployment(&self, deployment: Deployment) -> Result<()> {
        let Some(source) = self.sources.for_deployment(deployment) else {
            return Ok(());
        };
        let dir = self.store.deployment_dir(deployment.deployment_dir()).await?;
        let copied = copy_without_clobber(source, &dir).await?;
        tracing::debug!(
            "Copied {} files from {} into {}",
            copied,
            source.display(),
            dir.display()
        );
        Ok(())
    }

    async fn prepare(&self, deployment: Deployment, state: &State) -> Result<()> {
        self.seed_deployment(deployment).await?;

        let outputs = self.outputs.get_outputs(state).await?;
        let (variables, previous, ops_file) = match deployment {
            Deployment::Jumpbox => (&state.jumpbox.variables, &state.jumpbox.state, ""),
            Deployment::Director => (
                &state.bosh.variables,
                &state.bosh.state,
                state.bosh.user_ops_file.as_str(),
            ),
        };

        let input = InterpolateInput {
            deployment,
            iaas: self.iaas,
            deployment_vars: deployment_vars(deployment, self.iaas, state, &outputs)?,
            variables: variables.clone(),
            state: previous.clone(),
            ops_file: ops_file.to_string(),
        };
        self.executor.create_env_args(&input).await
    }

    pub async fn create_jumpbox(&self, mut state: State) -> Result<State> {
        self.logger.step("creating jumpbox");

        self.prepare(Deployment::Jumpbox, &state)
            .await
            .map_err(|e| wrap("Create", Deployment::Jumpbox, e))?;

        let output = self
            .executor
            .create_env(Deployment::Jumpbox)
            .await
            .map_err(|e| wrap("Create", Deployment::Jumpbox, e))?;

        let outputs = self.outputs.get_outputs(&state).await?;
        state.jumpbox.url = outputs.get_string("jumpbox_url");
        state.jumpbox.variables = output.variables;
        state.jumpbox.state = output.state;

        self.logger.step("created jumpbox");
        Ok(state)
    }

    pub async fn create_director(&self, mut state: State) -> Result<State> {
        if state.no_director {
            tracing::debug!("Director creation disabled for this environment");
            return Ok(state);
        }

        self.logger.step("creating bosh director");

        self.prepare(Deployment::Director, &state)
            .await
            .map_err(|e| wrap("Create", Deployment::Director, e))?;

        let output = self
            .executor
            .create_env(Deployment::Director)
            .await
            .map_err(|e| wrap("Create", Deployment::Director, e))?;

        let credentials = vars::director_credentials(&output.variables)?;
        let outputs = self.outputs.get_outputs(&state).await?;

        state.bosh.director_name = director_name(&state);
        state.bosh.director_address = outputs.get_string("director_address");
        state.bosh.director_username = DIRECTOR_USERNAME.to_string();
        state.bosh.director_password = credentials.password;
        state.bosh.director_ssl_ca = credentials.ssl_ca;
        state.bosh.director_ssl_certificate = credentials.ssl_certificate;
        state.bosh.director_ssl_private_key = credentials.ssl_private_key;
        state.bosh.variables = output.variables;
        state.bosh.state = output.state;

        self.logger.step("created bosh director");
        Ok(state)
    }

    pub async fn delete_director(&self, mut state: State) -> Result<State> {
        if !state.has_director() {
            tracing::debug!("No director to delete");
            return Ok(state);
        }

        self.logger.step("destroying bosh director");

        self.prepare(Deployment::Director, &state)
            .await
            .map_err(|e| wrap("Delete", Deployment::Director, e))?;
        self.executor
            .delete_env(Deployment::Director)
            .await
            .map_err(|e| wrap("Delete", Deployment::Director, e))?;

        state.bosh = Bosh::default();
        Ok(state)
    }

    pub async fn delete_jumpbox(&self, mut state: State) -> Result<State> {
        if !state.has_jumpbox() {
            tracing::debug!("No jumpbox to delete");
            return Ok(state);
        }

        self.logger.step("destroying jumpbox");

        self.prepare(Deployment::Jumpbox, &state)
            .await
            .map_err(|e| wrap("Delete", Deployment::Jumpbox, e))?;
        self.executor
            .delete_env(Deployment::Jumpbox)
            .await
            .map_err(|e| wrap("Delete", Deployment::Jumpbox, e))?;

        state.jumpbox = Jumpbox::default();
        Ok(state)
    }

    /// Rendered `--vars-file` contents for the jumpbox
    pub async fn jumpbox_deployment_vars(&self, state: &State) -> Result<String> {
        let outputs = self.outputs.get_outputs(state).await?;
        deployment_vars(Deployment::Jumpbox, self.iaas, state, &outputs)
    }

    /// Rendered `--vars-file` contents for the director
    pub async fn director_deployment_vars(&self, state: &State) -> Result<String> {
        let outputs = self.outputs.get_outputs(state).await?;
        deployment_vars(Deployment::Director, self.iaas, state, &outputs)
    }
}

fn wrap(action: &'static str, deployment: Deployment, source: BoshError) -> BoshError {
    BoshError::Deployment {
        action,
        deployment: deployment.name(),
        source: Box::new(source),
    }
}

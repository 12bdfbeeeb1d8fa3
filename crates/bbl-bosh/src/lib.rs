//! BOSH integration for bbl
//!
//! Creates and deletes the jumpbox and the director with `bosh create-env`,
//! driven through editable shell scripts in the state directory, and pushes
//! cloud-config to a running director.

pub mod client;
pub mod deployment_vars;
pub mod error;
pub mod executor;
pub mod manager;
pub mod sources;
pub mod vars;

pub use client::{
    CliClientProvider, DirectorClient, DirectorClientProvider, DirectorConnection,
    JUMPBOX_KEY_FILE, jumpbox_proxy,
};
pub use error::{BoshError, BoshVersionError, Result};
pub use executor::{BoshExecutor, CreateEnvOutput, Deployment, Executor, InterpolateInput};
pub use manager::{DeploymentSources, Manager};
pub use vars::DirectorCredentials;

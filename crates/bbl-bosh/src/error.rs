//! BOSH error types

use thiserror::Error;

/// The bosh CLI ran but its version could not be determined
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BoshVersionError(String);

impl BoshVersionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Error, Debug)]
pub enum BoshError {
    #[error("Run bosh {command}: {status}")]
    CommandFailed { command: String, status: String },

    #[error("{action} {deployment}: {source}")]
    Deployment {
        action: &'static str,
        deployment: &'static str,
        #[source]
        source: Box<BoshError>,
    },

    #[error(transparent)]
    Version(#[from] BoshVersionError),

    #[error("BOSH version must be at least v{minimum}, found v{found}")]
    VersionTooOld { found: String, minimum: String },

    #[error("Parse vars-store: {0}")]
    VarsStoreParse(String),

    #[error("Deployment source not found: {0}")]
    SourceNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Terraform(#[from] bbl_terraform::TerraformError),

    #[error(transparent)]
    State(#[from] bbl_core::StateError),
}

pub type Result<T> = std::result::Result<T, BoshError>;

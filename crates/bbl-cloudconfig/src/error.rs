//! Cloud-config error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudConfigError {
    #[error("Invalid CIDR block \"{0}\"")]
    InvalidCidr(String),

    #[error("Run bosh interpolate: {0}")]
    InterpolateFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Terraform(#[from] bbl_terraform::TerraformError),

    #[error(transparent)]
    Bosh(#[from] bbl_bosh::BoshError),

    #[error(transparent)]
    State(#[from] bbl_core::StateError),
}

pub type Result<T> = std::result::Result<T, CloudConfigError>;

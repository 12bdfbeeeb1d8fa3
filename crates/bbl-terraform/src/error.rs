//! Terraform error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerraformError {
    #[error("Retrieving availability zones: {0}")]
    ZonesUnavailable(String),

    #[error("Zone list is empty")]
    EmptyZones,

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Run terraform {operation}: {status}")]
    CommandFailed { operation: String, status: String },

    #[error("Terraform version could not be parsed: {0}")]
    VersionParse(String),

    #[error("Terraform version must be at least v{minimum}, found v{found}")]
    VersionTooOld { found: String, minimum: String },

    #[error("Parse terraform outputs: {0}")]
    OutputParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    State(#[from] bbl_core::StateError),
}

pub type Result<T> = std::result::Result<T, TerraformError>;

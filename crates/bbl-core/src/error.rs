//! State and store error types

use thiserror::Error;

/// Errors raised while loading, validating or persisting the bbl state
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Stat state dir: {0}")]
    StateDirMissing(String),

    #[error(
        "Existing bbl environment is incompatible with bbl v3. Create a new environment with v3 to continue."
    )]
    IncompatibleVersion(u32),

    #[error(
        "Existing bbl environment was created with a newer version of bbl. Please upgrade to a version of bbl compatible with schema version {0}."
    )]
    NewerVersion(u32),

    #[error("Unknown IAAS \"{0}\": expected one of aws, gcp, azure")]
    UnknownIaas(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StateError>;

//! Terraform integration for bbl
//!
//! Generates provider-specific templates and input variables from the
//! environment state, drives the `terraform` binary and reads its state and
//! outputs back.
//!
//! # Requirements
//!
//! - `terraform` (>= 0.12) on the PATH, or an explicit path
//! - the provider CLI (`aws` / `gcloud`) when zones are looked up from it

pub mod aws;
pub mod azure;
pub mod error;
pub mod executor;
pub mod gcp;
pub mod generator;
pub mod manager;
pub mod outputs;
pub mod zones;

pub use error::{Result, TerraformError};
pub use executor::{Executor, ExecutorError, RunOutput, TerraformExecutor};
pub use generator::{InputGenerator, Inputs, TemplateGenerator};
pub use manager::{Manager, ManagerError};
pub use outputs::{Outputs, OutputsProvider};
pub use zones::{AwsCliZones, GcloudZones, ZoneRetriever};

//! Cloud-config generation for bbl
//!
//! A fixed base cloud-config is patched with IaaS-specific ops derived from
//! terraform outputs, interpolated with `bosh interpolate`, and pushed to the
//! director.

pub mod aws;
pub mod azure;
pub mod base;
pub mod error;
pub mod gcp;
pub mod manager;
pub mod network;
pub mod ops;

pub use aws::AwsOpsGenerator;
pub use azure::AzureOpsGenerator;
pub use error::{CloudConfigError, Result};
pub use gcp::GcpOpsGenerator;
pub use manager::Manager;
pub use network::{Cidr, SubnetRanges};
pub use ops::{Op, OpsGenerator};

#[cfg(test)]
mod fakes;

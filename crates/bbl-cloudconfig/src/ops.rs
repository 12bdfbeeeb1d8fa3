//! Ops-file model shared by the per-IaaS generators

use crate::error::Result;
use crate::network::{Cidr, SubnetRanges};
use async_trait::async_trait;
use bbl_core::State;
use serde::Serialize;

/// One `bosh interpolate` patch operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Op {
    #[serde(rename = "type")]
    pub op_type: String,
    pub path: String,
    pub value: serde_yaml::Value,
}

impl Op {
    pub fn replace(path: impl Into<String>, value: impl Serialize) -> Result<Self> {
        Ok(Self {
            op_type: "replace".to_string(),
            path: path.into(),
            value: serde_yaml::to_value(value)?,
        })
    }
}

/// Produces the ops file applied on top of the base cloud-config
#[async_trait]
pub trait OpsGenerator: Send + Sync {
    /// Fixed ops (vm types, disk types, compilation) for this IaaS
    fn base_ops(&self) -> &'static str;

    /// Ops derived from the state and its terraform outputs
    async fn ops(&self, state: &State) -> Result<Vec<Op>>;

    /// The complete ops file: base ops followed by the generated ones
    async fn generate(&self, state: &State) -> Result<String> {
        let ops = self.ops(state).await?;
        render(self.base_ops(), &ops)
    }
}

pub fn render(base_ops: &str, ops: &[Op]) -> Result<String> {
    Ok(format!("{}\n{}", base_ops, serde_yaml::to_string(ops)?))
}

/// `z1`, `z2`, ...
pub fn az_name(index: usize) -> String {
    format!("z{}", index + 1)
}

#[derive(Debug, Clone, Serialize)]
pub struct Subnet<P> {
    pub az: String,
    pub gateway: String,
    pub range: String,
    pub reserved: Vec<String>,
    #[serde(rename = "static")]
    pub static_ips: Vec<String>,
    pub cloud_properties: P,
}

impl<P> Subnet<P> {
    /// Subnet for zone `index`, carved from its `/20` block
    pub fn for_zone(index: usize, cloud_properties: P) -> Result<Self> {
        let SubnetRanges {
            range,
            gateway,
            reserved,
            static_ips,
        } = Cidr::for_zone(index)?.subnet_ranges();

        Ok(Self {
            az: az_name(index),
            gateway,
            range,
            reserved,
            static_ips,
            cloud_properties,
        })
    }
}

#[derive(Serialize)]
struct Network<'a, P> {
    name: &'static str,
    subnets: &'a [Subnet<P>],
    #[serde(rename = "type")]
    network_type: &'static str,
}

#[derive(Serialize)]
struct Az<P> {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cloud_properties: Option<P>,
}

#[derive(Serialize)]
struct VmExtension<P> {
    name: &'static str,
    cloud_properties: P,
}

pub fn az_op<P: Serialize>(index: usize, cloud_properties: Option<P>) -> Result<Op> {
    Op::replace(
        "/azs/-",
        Az {
            name: az_name(index),
            cloud_properties,
        },
    )
}

/// `private` and `default` manual networks over the same subnets
pub fn network_ops<P: Serialize>(subnets: &[Subnet<P>]) -> Result<Vec<Op>> {
    ["private", "default"]
        .into_iter()
        .map(|name| {
            Op::replace(
                "/networks/-",
                Network {
                    name,
                    subnets,
                    network_type: "manual",
                },
            )
        })
        .collect()
}

pub fn vm_extension_op<P: Serialize>(name: &'static str, cloud_properties: P) -> Result<Op> {
    Op::replace(
        "/vm_extensions/-",
        VmExtension {
            name,
            cloud_properties,
        },
    )
}

/// Names of the extensions a cf load balancer contributes, in order
pub const CF_EXTENSIONS: [&str; 4] = [
    "cf-router-network-properties",
    "diego-ssh-proxy-network-properties",
    "cf-tcp-router-network-properties",
    "credhub-network-properties",
];

pub const CONCOURSE_EXTENSION: &str = "lb";

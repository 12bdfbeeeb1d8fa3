//! GCP cloud-config ops

use crate::error::Result;
use crate::ops::{
    CF_EXTENSIONS, CONCOURSE_EXTENSION, Op, OpsGenerator, Subnet, az_op, network_ops,
    vm_extension_op,
};
use async_trait::async_trait;
use bbl_core::State;
use bbl_terraform::{Outputs, OutputsProvider};
use serde::Serialize;
use std::sync::Arc;

pub const BASE_OPS: &str = r#"- type: replace
  path: /compilation/vm_type
  value: default

- type: replace
  path: /vm_types/name=minimal/cloud_properties?
  value:
    machine_type: n1-standard-1
    root_disk_size_gb: 10
    root_disk_type: pd-ssd

- type: replace
  path: /vm_types/name=small/cloud_properties?
  value:
    machine_type: g1-small
    root_disk_size_gb: 10
    root_disk_type: pd-ssd

- type: replace
  path: /vm_types/name=default/cloud_properties?
  value:
    machine_type: n1-standard-2
    root_disk_size_gb: 10
    root_disk_type: pd-ssd

- type: replace
  path: /vm_types/name=large/cloud_properties?
  value:
    machine_type: n1-standard-4
    root_disk_size_gb: 50
    root_disk_type: pd-ssd

- type: replace
  path: /vm_extensions/name=5GB_ephemeral_disk/cloud_properties?
  value:
    root_disk_size_gb: 5

- type: replace
  path: /vm_extensions/name=10GB_ephemeral_disk/cloud_properties?
  value:
    root_disk_size_gb: 10

- type: replace
  path: /vm_extensions/name=50GB_ephemeral_disk/cloud_properties?
  value:
    root_disk_size_gb: 50

- type: replace
  path: /vm_extensions/name=100GB_ephemeral_disk/cloud_properties?
  value:
    root_disk_size_gb: 100
"#;

#[derive(Serialize)]
struct AzCloudProperties {
    zone: String,
}

#[derive(Debug, Clone, Serialize)]
struct SubnetCloudProperties {
    ephemeral_external_ip: bool,
    network_name: String,
    subnetwork_name: String,
    tags: Vec<String>,
}

#[derive(Default, Serialize)]
struct LbCloudProperties {
    #[serde(skip_serializing_if = "String::is_empty")]
    backend_service: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    target_pool: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
}

impl LbCloudProperties {
    fn target_pool(outputs: &Outputs, key: &str) -> Self {
        let pool = outputs.get_string(key);
        Self {
            target_pool: pool.clone(),
            tags: vec![pool],
            ..Self::default()
        }
    }
}

pub struct GcpOpsGenerator {
    outputs: Arc<dyn OutputsProvider>,
}

impl GcpOpsGenerator {
    pub fn new(outputs: Arc<dyn OutputsProvider>) -> Self {
        Self { outputs }
    }

    fn lb_ops(state: &State, outputs: &Outputs) -> Result<Vec<Op>> {
        if state.lb.is_concourse() {
            return Ok(vec![vm_extension_op(
                CONCOURSE_EXTENSION,
                LbCloudProperties {
                    target_pool: outputs.get_string("concourse_target_pool"),
                    ..LbCloudProperties::default()
                },
            )?]);
        }

        if !state.lb.is_cf() {
            return Ok(Vec::new());
        }

        let backend = outputs.get_string("router_backend_service");
        let ws_pool = outputs.get_string("ws_target_pool");
        let router = LbCloudProperties {
            backend_service: backend.clone(),
            target_pool: ws_pool.clone(),
            tags: vec![backend, ws_pool],
        };

        let properties = [
            router,
            LbCloudProperties::target_pool(outputs, "ssh_proxy_target_pool"),
            LbCloudProperties::target_pool(outputs, "tcp_router_target_pool"),
            LbCloudProperties::target_pool(outputs, "credhub_target_pool"),
        ];

        CF_EXTENSIONS
            .into_iter()
            .zip(properties)
            .map(|(name, props)| vm_extension_op(name, props))
            .collect()
    }
}

#[async_trait]
impl OpsGenerator for GcpOpsGenerator {
    fn base_ops(&self) -> &'static str {
        BASE_OPS
    }

    async fn ops(&self, state: &State) -> Result<Vec<Op>> {
        let outputs = self.outputs.get_outputs(state).await?;

        let subnet_properties = SubnetCloudProperties {
            ephemeral_external_ip: true,
            network_name: outputs.get_string("network_name"),
            subnetwork_name: outputs.get_string("subnetwork_name"),
            tags: vec![outputs.get_string("internal_tag_name")],
        };

        let mut ops = Vec::new();
        let mut subnets = Vec::new();
        for (i, zone) in state.gcp.zones.iter().enumerate() {
            ops.push(az_op(i, Some(AzCloudProperties { zone: zone.clone() }))?);
            subnets.push(Subnet::for_zone(i, subnet_properties.clone())?);
        }

        ops.extend(network_ops(&subnets)?);
        ops.extend(Self::lb_ops(state, &outputs)?);
        Ok(ops)
    }
}

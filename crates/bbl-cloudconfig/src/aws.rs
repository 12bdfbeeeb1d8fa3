//! AWS cloud-config ops

use crate::error::Result;
use crate::ops::{
    CF_EXTENSIONS, CONCOURSE_EXTENSION, Op, OpsGenerator, Subnet, az_op, network_ops,
    vm_extension_op,
};
use async_trait::async_trait;
use bbl_core::State;
use bbl_terraform::{Outputs, OutputsProvider, ZoneRetriever};
use serde::Serialize;
use std::sync::Arc;

pub const BASE_OPS: &str = r#"- type: replace
  path: /compilation/vm_type
  value: default

- type: replace
  path: /vm_types/name=minimal/cloud_properties?
  value:
    instance_type: m4.large
    ephemeral_disk:
      size: 10240
      type: gp2

- type: replace
  path: /vm_types/name=small/cloud_properties?
  value:
    instance_type: m4.large
    ephemeral_disk:
      size: 10240
      type: gp2

- type: replace
  path: /vm_types/name=default/cloud_properties?
  value:
    instance_type: m4.large
    ephemeral_disk:
      size: 10240
      type: gp2

- type: replace
  path: /vm_types/name=large/cloud_properties?
  value:
    instance_type: m4.xlarge
    ephemeral_disk:
      size: 51200
      type: gp2

- type: replace
  path: /disk_types/name=default/cloud_properties?
  value:
    type: gp2

- type: replace
  path: /vm_extensions/name=5GB_ephemeral_disk/cloud_properties?
  value:
    ephemeral_disk:
      size: 5120
      type: gp2

- type: replace
  path: /vm_extensions/name=10GB_ephemeral_disk/cloud_properties?
  value:
    ephemeral_disk:
      size: 10240
      type: gp2

- type: replace
  path: /vm_extensions/name=50GB_ephemeral_disk/cloud_properties?
  value:
    ephemeral_disk:
      size: 51200
      type: gp2

- type: replace
  path: /vm_extensions/name=100GB_ephemeral_disk/cloud_properties?
  value:
    ephemeral_disk:
      size: 102400
      type: gp2
"#;

#[derive(Serialize)]
struct AzCloudProperties {
    availability_zone: String,
}

#[derive(Serialize)]
struct SubnetCloudProperties {
    subnet: String,
}

#[derive(Default, Serialize)]
struct LbCloudProperties {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    elbs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    lb_target_groups: Vec<String>,
    security_groups: Vec<String>,
}

impl LbCloudProperties {
    fn elb(outputs: &Outputs, lb: &str, security_group: &str) -> Self {
        Self {
            elbs: vec![outputs.get_string(lb)],
            security_groups: vec![
                outputs.get_string(security_group),
                outputs.get_string("internal_security_group"),
            ],
            ..Self::default()
        }
    }
}

pub struct AwsOpsGenerator {
    outputs: Arc<dyn OutputsProvider>,
    zones: Arc<dyn ZoneRetriever>,
}

impl AwsOpsGenerator {
    pub fn new(outputs: Arc<dyn OutputsProvider>, zones: Arc<dyn ZoneRetriever>) -> Self {
        Self { outputs, zones }
    }

    fn lb_ops(state: &State, outputs: &Outputs) -> Result<Vec<Op>> {
        if state.lb.is_concourse() {
            let props = LbCloudProperties::elb(
                outputs,
                "concourse_lb_name",
                "concourse_lb_internal_security_group",
            );
            return Ok(vec![vm_extension_op(CONCOURSE_EXTENSION, props)?]);
        }

        if !state.lb.is_cf() {
            return Ok(Vec::new());
        }

        let credhub = LbCloudProperties {
            lb_target_groups: vec![outputs.get_string("credhub_target_group")],
            security_groups: vec![
                outputs.get_string("credhub_lb_internal_security_group"),
                outputs.get_string("internal_security_group"),
            ],
            ..LbCloudProperties::default()
        };

        let properties = [
            LbCloudProperties::elb(
                outputs,
                "cf_router_lb_name",
                "cf_router_lb_internal_security_group",
            ),
            LbCloudProperties::elb(outputs, "cf_ssh_lb_name", "cf_ssh_lb_internal_security_group"),
            LbCloudProperties::elb(outputs, "cf_tcp_lb_name", "cf_tcp_lb_internal_security_group"),
            credhub,
        ];

        CF_EXTENSIONS
            .into_iter()
            .zip(properties)
            .map(|(name, props)| vm_extension_op(name, props))
            .collect()
    }
}

#[async_trait]
impl OpsGenerator for AwsOpsGenerator {
    fn base_ops(&self) -> &'static str {
        BASE_OPS
    }

    async fn ops(&self, state: &State) -> Result<Vec<Op>> {
        let zones = self.zones.zones(&state.aws.region).await?;
        let outputs = self.outputs.get_outputs(state).await?;
        let subnet_ids = outputs.get_string_list("internal_subnet_ids");

        let mut ops = Vec::new();
        let mut subnets = Vec::new();
        for (i, zone) in zones.iter().enumerate() {
            ops.push(az_op(
                i,
                Some(AzCloudProperties {
                    availability_zone: zone.clone(),
                }),
            )?);
            let subnet = subnet_ids.get(i).cloned().unwrap_or_default();
            subnets.push(Subnet::for_zone(i, SubnetCloudProperties { subnet })?);
        }

        ops.extend(network_ops(&subnets)?);
        ops.extend(Self::lb_ops(state, &outputs)?);
        Ok(ops)
    }
}

//! Azure cloud-config ops
//!
//! Azure environments have a single availability zone, `z1`.

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
    instance_type: Standard_F1s
    ephemeral_disk:
      size: 10240

- type: replace
  path: /vm_types/name=small/cloud_properties?
  value:
    instance_type: Standard_F2s
    ephemeral_disk:
      size: 10240

- type: replace
  path: /vm_types/name=default/cloud_properties?
  value:
    instance_type: Standard_DS1_v2
    ephemeral_disk:
      size: 10240

- type: replace
  path: /vm_types/name=large/cloud_properties?
  value:
    instance_type: Standard_DS2_v2
    ephemeral_disk:
      size: 51200

- type: replace
  path: /vm_extensions/name=5GB_ephemeral_disk/cloud_properties?
  value:
    ephemeral_disk:
      size: 5120

- type: replace
  path: /vm_extensions/name=10GB_ephemeral_disk/cloud_properties?
  value:
    ephemeral_disk:
      size: 10240

- type: replace
  path: /vm_extensions/name=50GB_ephemeral_disk/cloud_properties?
  value:
    ephemeral_disk:
      size: 51200

- type: replace
  path: /vm_extensions/name=100GB_ephemeral_disk/cloud_properties?
  value:
    ephemeral_disk:
      size: 102400
"#;

#[derive(Serialize)]
struct SubnetCloudProperties {
    virtual_network_name: String,
    subnet_name: String,
    security_group: String,
}

#[derive(Serialize)]
struct LbCloudProperties {
    load_balancer: String,
}

impl LbCloudProperties {
    fn named(outputs: &Outputs, key: &str) -> Self {
        Self {
            load_balancer: outputs.get_string(key),
        }
    }
}

pub struct AzureOpsGenerator {
    outputs: Arc<dyn OutputsProvider>,
}

impl AzureOpsGenerator {
    pub fn new(outputs: Arc<dyn OutputsProvider>) -> Self {
        Self { outputs }
    }

    fn lb_ops(state: &State, outputs: &Outputs) -> Result<Vec<Op>> {
        if state.lb.is_concourse() {
            let props = LbCloudProperties::named(outputs, "concourse_lb_name");
            return Ok(vec![vm_extension_op(CONCOURSE_EXTENSION, props)?]);
        }

        if !state.lb.is_cf() {
            return Ok(Vec::new());
        }

        let properties = [
            "cf_router_lb_name",
            "cf_ssh_lb_name",
            "cf_tcp_lb_name",
            "credhub_lb_name",
        ]
        .map(|key| LbCloudProperties::named(outputs, key));

        CF_EXTENSIONS
            .into_iter()
            .zip(properties)
            .map(|(name, props)| vm_extension_op(name, props))
            .collect()
    }
}

#[async_trait]
impl OpsGenerator for AzureOpsGenerator {
    fn base_ops(&self) -> &'static str {
        BASE_OPS
    }

    async fn ops(&self, state: &State) -> Result<Vec<Op>> {
        let outputs = self.outputs.get_outputs(state).await?;

        let subnet = Subnet::for_zone(
            0,
            SubnetCloudProperties {
                virtual_network_name: outputs.get_string("vnet_name"),
                subnet_name: outputs.get_string("subnet_name"),
                security_group: outputs.get_string("default_security_group"),
            },
        )?;

        let mut ops = vec![az_op::<()>(0, None)?];
        ops.extend(network_ops(&[subnet])?);
        ops.extend(Self::lb_ops(state, &outputs)?);
        Ok(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FixedOutputs;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn generator() -> AzureOpsGenerator {
        let outputs = Outputs::new(BTreeMap::from([
            ("vnet_name".to_string(), json!("some-vnet")),
            ("subnet_name".to_string(), json!("some-subnet")),
            ("default_security_group".to_string(), json!("some-sg")),
            ("concourse_lb_name".to_string(), json!("concourse-lb")),
            ("cf_router_lb_name".to_string(), json!("router-lb")),
            ("credhub_lb_name".to_string(), json!("credhub-lb")),
        ]));
        AzureOpsGenerator::new(Arc::new(FixedOutputs(outputs)))
    }

    fn state(lb_type: &str) -> State {
        let mut state = State::default();
        state.lb.lb_type = lb_type.into();
        state
    }

    #[tokio::test]
    async fn test_single_zone() {
        let ops = generator().ops(&state("")).await.unwrap();

        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0].value["name"], "z1");
        let subnet = &ops[1].value["subnets"][0];
        assert_eq!(subnet["range"], "10.0.16.0/20");
        assert_eq!(subnet["cloud_properties"]["virtual_network_name"], "some-vnet");
        assert_eq!(subnet["cloud_properties"]["subnet_name"], "some-subnet");
        assert_eq!(subnet["cloud_properties"]["security_group"], "some-sg");
    }

    #[tokio::test]
    async fn test_lb_extensions() {
        let ops = generator().ops(&state("concourse")).await.unwrap();
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[3].value["cloud_properties"]["load_balancer"], "concourse-lb");

        let ops = generator().ops(&state("cf")).await.unwrap();
        assert_eq!(ops.len(), 7);
        assert_eq!(ops[3].value["name"], "cf-router-network-properties");
        assert_eq!(ops[3].value["cloud_properties"]["load_balancer"], "router-lb");
        assert_eq!(ops[6].value["cloud_properties"]["load_balancer"], "credhub-lb");
    }
}

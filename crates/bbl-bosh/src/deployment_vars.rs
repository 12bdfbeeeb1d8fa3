//! `--vars-file` contents for the jumpbox and director, derived from terraform outputs

use crate::error::Result;
use crate::executor::Deployment;
use bbl_core::{Iaas, State};
use bbl_terraform::Outputs;
use serde_yaml::{Mapping, Value};

/// Build the deployment vars YAML for `deployment`
pub fn deployment_vars(
    deployment: Deployment,
    iaas: Iaas,
    state: &State,
    outputs: &Outputs,
) -> Result<String> {
    let mut vars = Vars::default();

    vars.set("director_name", director_name(state));
    vars.set("internal_cidr", outputs.get_string("internal_cidr"));
    vars.set("internal_gw", outputs.get_string("internal_gw"));

    match deployment {
        Deployment::Jumpbox => {
            vars.set("internal_ip", outputs.get_string("jumpbox_internal_ip"));
            vars.set("external_ip", outputs.get_string("external_ip"));
        }
        Deployment::Director => {
            vars.set("internal_ip", outputs.get_string("internal_ip"));
        }
    }

    match iaas {
        Iaas::Aws => aws_vars(&mut vars, deployment, state, outputs),
        Iaas::Gcp => gcp_vars(&mut vars, deployment, state, outputs),
        Iaas::Azure => azure_vars(&mut vars, state, outputs),
    }

    Ok(serde_yaml::to_string(&vars.0)?)
}

pub fn director_name(state: &State) -> String {
    if state.bosh.director_name.is_empty() {
        format!("bosh-{}", state.env_id)
    } else {
        state.bosh.director_name.clone()
    }
}

fn aws_vars(vars: &mut Vars, deployment: Deployment, state: &State, outputs: &Outputs) {
    vars.set("az", outputs.get_string("az"));
    vars.set("subnet_id", outputs.get_string("subnet_id"));
    vars.set("access_key_id", state.aws.access_key_id.clone());
    vars.set("secret_access_key", state.aws.secret_access_key.clone());
    vars.set("region", state.aws.region.clone());
    vars.set("default_key_name", outputs.get_string("default_key_name"));
    vars.set("private_key", outputs.get_string("private_key"));

    match deployment {
        Deployment::Jumpbox => {
            vars.set_list(
                "default_security_groups",
                vec![outputs.get_string("jumpbox_security_group")],
            );
        }
        Deployment::Director => {
            vars.set_list(
                "default_security_groups",
                outputs.get_string_list("default_security_groups"),
            );
            vars.set("iam_instance_profile", outputs.get_string("iam_instance_profile"));
            vars.set("kms_key_arn", outputs.get_string("kms_key_arn"));
        }
    }
}

fn gcp_vars(vars: &mut Vars, deployment: Deployment, state: &State, outputs: &Outputs) {
    let zone = if state.gcp.zone.is_empty() {
        state.gcp.zones.first().cloned().unwrap_or_default()
    } else {
        state.gcp.zone.clone()
    };

    vars.set("zone", zone);
    vars.set("network", outputs.get_string("network_name"));
    vars.set("subnetwork", outputs.get_string("subnetwork_name"));
    vars.set("project_id", state.gcp.project_id.clone());
    vars.set("gcp_credentials_json", state.gcp.service_account_key.clone());

    let role_tag = match deployment {
        Deployment::Jumpbox => outputs.get_string("jumpbox_tag_name"),
        Deployment::Director => outputs.get_string("bosh_director_tag_name"),
    };
    vars.set_list(
        "tags",
        vec![role_tag, outputs.get_string("internal_tag_name")],
    );
}

fn azure_vars(vars: &mut Vars, state: &State, outputs: &Outputs) {
    vars.set("vnet_name", outputs.get_string("vnet_name"));
    vars.set("subnet_name", outputs.get_string("subnet_name"));
    vars.set("subscription_id", state.azure.subscription_id.clone());
    vars.set("tenant_id", state.azure.tenant_id.clone());
    vars.set("client_id", state.azure.client_id.clone());
    vars.set("client_secret", state.azure.client_secret.clone());
    vars.set("resource_group_name", outputs.get_string("resource_group_name"));
    vars.set("storage_account_name", outputs.get_string("storage_account_name"));
    vars.set("default_security_group", outputs.get_string("default_security_group"));
    vars.set("environment", "AzureCloud".to_string());
}

/// Insertion-ordered YAML mapping
#[derive(Default)]
struct Vars(Mapping);

impl Vars {
    fn set(&mut self, key: &str, value: String) {
        self.0.insert(Value::from(key), Value::from(value));
    }

    fn set_list(&mut self, key: &str, values: Vec<String>) {
        let list = values.into_iter().map(Value::from).collect();
        self.0.insert(Value::from(key), Value::Sequence(list));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbl_core::Gcp;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn outputs() -> Outputs {
        Outputs::new(BTreeMap::from([
            ("internal_cidr".to_string(), json!("10.0.0.0/24")),
            ("internal_gw".to_string(), json!("10.0.0.1")),
            ("internal_ip".to_string(), json!("10.0.0.6")),
            ("jumpbox_internal_ip".to_string(), json!("10.0.0.5")),
            ("external_ip".to_string(), json!("35.1.2.3")),
            ("network_name".to_string(), json!("some-network")),
            ("subnetwork_name".to_string(), json!("some-subnetwork")),
            ("internal_tag_name".to_string(), json!("some-internal-tag")),
            ("jumpbox_tag_name".to_string(), json!("some-jumpbox-tag")),
            ("bosh_director_tag_name".to_string(), json!("some-director-tag")),
        ]))
    }

    fn gcp_state() -> State {
        State {
            env_id: "some-env".into(),
            gcp: Gcp {
                service_account_key: "some-key".into(),
                project_id: "some-project".into(),
                region: "us-east1".into(),
                zones: vec!["us-east1-b".into(), "us-east1-c".into()],
                ..Gcp::default()
            },
            ..State::default()
        }
    }

    fn parse(yaml: &str) -> serde_yaml::Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_gcp_jumpbox_vars() {
        let yaml =
            deployment_vars(Deployment::Jumpbox, Iaas::Gcp, &gcp_state(), &outputs()).unwrap();
        let vars = parse(&yaml);

        assert_eq!(vars["director_name"], "bosh-some-env");
        assert_eq!(vars["internal_cidr"], "10.0.0.0/24");
        assert_eq!(vars["internal_ip"], "10.0.0.5");
        assert_eq!(vars["external_ip"], "35.1.2.3");
        assert_eq!(vars["zone"], "us-east1-b");
        assert_eq!(vars["project_id"], "some-project");
        assert_eq!(vars["gcp_credentials_json"], "some-key");
        assert_eq!(vars["tags"][0], "some-jumpbox-tag");
        assert_eq!(vars["tags"][1], "some-internal-tag");
        assert!(yaml.starts_with("director_name: bosh-some-env\n"));
    }

    #[test]
    fn test_gcp_director_vars() {
        let yaml =
            deployment_vars(Deployment::Director, Iaas::Gcp, &gcp_state(), &outputs()).unwrap();
        let vars = parse(&yaml);

        assert_eq!(vars["internal_ip"], "10.0.0.6");
        assert!(vars.get("external_ip").is_none());
        assert_eq!(vars["tags"][0], "some-director-tag");
    }

    #[test]
    fn test_aws_director_vars() {
        let mut state = gcp_state();
        state.aws.region = "us-west-1".into();
        let mut outputs = BTreeMap::from([
            ("default_security_groups".to_string(), json!(["sg-1"])),
            ("kms_key_arn".to_string(), json!("some-arn")),
        ]);
        outputs.insert("az".into(), json!("us-west-1a"));

        let yaml =
            deployment_vars(Deployment::Director, Iaas::Aws, &state, &Outputs::new(outputs))
                .unwrap();
        let vars = parse(&yaml);

        assert_eq!(vars["region"], "us-west-1");
        assert_eq!(vars["az"], "us-west-1a");
        assert_eq!(vars["default_security_groups"][0], "sg-1");
        assert_eq!(vars["kms_key_arn"], "some-arn");
        assert_eq!(vars["internal_cidr"], "");
    }

    #[test]
    fn test_existing_director_name_kept() {
        let mut state = gcp_state();
        state.bosh.director_name = "my-director".into();
        assert_eq!(director_name(&state), "my-director");
    }
}

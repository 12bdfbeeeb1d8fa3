//! Persisted environment state
//!
//! One `State` document describes one environment. It is threaded by value
//! through every pipeline stage and written back after each stage that
//! mutates it.

use crate::iaas::{self, Iaas};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The whole environment, as stored in `bbl-state.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    /// Schema version, stamped on every save
    pub version: u32,

    /// Provider the environment was created on
    #[serde(with = "iaas::optional")]
    pub iaas: Option<Iaas>,

    /// Stable environment identity, assigned on first save
    pub id: String,

    /// Skip the director lifecycle entirely
    #[serde(rename = "noDirector")]
    pub no_director: bool,

    pub aws: Aws,
    pub azure: Azure,
    pub gcp: Gcp,
    pub jumpbox: Jumpbox,
    pub bosh: Bosh,

    #[serde(rename = "envID")]
    pub env_id: String,

    /// Embedded terraform state; the authoritative backup of terraform's own file
    #[serde(rename = "tfState")]
    pub tf_state: String,

    pub lb: Lb,

    /// Raw output of the last terraform run
    #[serde(rename = "latestTFOutput")]
    pub latest_tf_output: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Aws {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub access_key_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret_access_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Azure {
    pub subscription_id: String,
    pub tenant_id: String,
    pub client_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_secret: String,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gcp {
    #[serde(rename = "serviceAccountKey", skip_serializing_if = "String::is_empty")]
    pub service_account_key: String,
    #[serde(rename = "projectID", skip_serializing_if = "String::is_empty")]
    pub project_id: String,
    pub zone: String,
    pub region: String,
    pub zones: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Jumpbox {
    pub url: String,
    pub variables: String,
    pub manifest: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub state: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bosh {
    #[serde(rename = "directorName")]
    pub director_name: String,
    #[serde(rename = "directorUsername")]
    pub director_username: String,
    #[serde(rename = "directorPassword")]
    pub director_password: String,
    #[serde(rename = "directorAddress")]
    pub director_address: String,
    #[serde(rename = "directorSSLCA")]
    pub director_ssl_ca: String,
    #[serde(rename = "directorSSLCertificate")]
    pub director_ssl_certificate: String,
    #[serde(rename = "directorSSLPrivateKey")]
    pub director_ssl_private_key: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub state: Map<String, Value>,
    pub variables: String,
    pub manifest: String,
    #[serde(rename = "userOpsFile")]
    pub user_ops_file: String,
}

/// Load balancer request supplied by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lb {
    #[serde(rename = "type")]
    pub lb_type: String,
    pub cert: String,
    pub key: String,
    pub chain: String,
    pub domain: String,
}

impl State {
    /// True when nothing distinguishes this state from "no environment"
    pub fn is_empty(&self) -> bool {
        *self == State::default()
    }

    /// Clear every field that must never reach the disk
    pub fn strip_secrets(&mut self) {
        self.aws.access_key_id.clear();
        self.aws.secret_access_key.clear();
        self.gcp.service_account_key.clear();
        self.gcp.project_id.clear();
        self.azure.client_secret.clear();
    }

    /// Whether a director has been created (or is expected) for this environment
    pub fn has_director(&self) -> bool {
        !self.no_director && self.bosh != Bosh::default()
    }

    pub fn has_jumpbox(&self) -> bool {
        self.jumpbox != Jumpbox::default()
    }
}

impl Lb {
    pub fn is_cf(&self) -> bool {
        self.lb_type == "cf"
    }

    pub fn is_concourse(&self) -> bool {
        self.lb_type == "concourse"
    }

    pub fn has_certificate(&self) -> bool {
        !self.cert.is_empty() && !self.key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_empty() {
        assert!(State::default().is_empty());

        let state = State {
            env_id: "some-env".to_string(),
            ..Default::default()
        };
        assert!(!state.is_empty());
    }

    #[test]
    fn test_strip_secrets() {
        let mut state = State::default();
        state.aws.access_key_id = "access".to_string();
        state.aws.secret_access_key = "secret".to_string();
        state.aws.region = "us-east-1".to_string();
        state.gcp.service_account_key = "{}".to_string();
        state.gcp.project_id = "project".to_string();
        state.azure.client_secret = "client-secret".to_string();
        state.azure.client_id = "client-id".to_string();

        state.strip_secrets();

        assert!(state.aws.access_key_id.is_empty());
        assert!(state.aws.secret_access_key.is_empty());
        assert!(state.gcp.service_account_key.is_empty());
        assert!(state.gcp.project_id.is_empty());
        assert!(state.azure.client_secret.is_empty());
        assert_eq!(state.aws.region, "us-east-1");
        assert_eq!(state.azure.client_id, "client-id");
    }

    #[test]
    fn test_json_keys() {
        let mut state = State {
            version: 12,
            iaas: Some(Iaas::Gcp),
            env_id: "env".to_string(),
            tf_state: "tf".to_string(),
            ..Default::default()
        };
        state.bosh.director_ssl_ca = "ca".to_string();
        state.lb.lb_type = "cf".to_string();

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["iaas"], "gcp");
        assert_eq!(json["envID"], "env");
        assert_eq!(json["tfState"], "tf");
        assert_eq!(json["noDirector"], false);
        assert_eq!(json["bosh"]["directorSSLCA"], "ca");
        assert_eq!(json["lb"]["type"], "cf");
        assert!(json["aws"].get("accessKeyId").is_none());
    }

    #[test]
    fn test_unset_iaas_encodes_as_empty_string() {
        let json = serde_json::to_value(State::default()).unwrap();
        assert_eq!(json["iaas"], "");

        let decoded: State = serde_json::from_str(r#"{"iaas": ""}"#).unwrap();
        assert_eq!(decoded.iaas, None);
    }

    #[test]
    fn test_has_director() {
        let mut state = State::default();
        assert!(!state.has_director());

        state.bosh.director_address = "https://10.0.0.6:25555".to_string();
        assert!(state.has_director());

        state.no_director = true;
        assert!(!state.has_director());
    }
}

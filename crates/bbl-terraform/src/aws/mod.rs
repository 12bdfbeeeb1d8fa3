//! AWS templates and inputs

pub mod templates;

use crate::error::{Result, TerraformError};
use crate::generator::{
    InputGenerator, Inputs, TemplateGenerator, compose, retrieve_zones, write_lb_certificates,
};
use crate::zones::ZoneRetriever;
use async_trait::async_trait;
use bbl_core::{FileIo, State, StateStore};
use serde_json::json;
use std::sync::Arc;

/// ELB names are capped at 32 characters, and the longest suffix is `-cf-router-lb`
const SHORT_ENV_ID_LEN: usize = 18;

#[derive(Debug, Clone, Copy, Default)]
pub struct AwsTemplateGenerator;

impl TemplateGenerator for AwsTemplateGenerator {
    fn generate(&self, state: &State) -> String {
        compose(
            templates::BASE,
            &state.lb,
            &[templates::LB_SUBNETS, templates::CF_LB],
            templates::CF_DNS,
            &[templates::LB_SUBNETS, templates::CONCOURSE_LB],
        )
    }
}

pub struct AwsInputGenerator {
    zones: Arc<dyn ZoneRetriever>,
    store: Arc<dyn StateStore>,
    fs: Arc<dyn FileIo>,
}

impl AwsInputGenerator {
    pub fn new(
        zones: Arc<dyn ZoneRetriever>,
        store: Arc<dyn StateStore>,
        fs: Arc<dyn FileIo>,
    ) -> Self {
        Self { zones, store, fs }
    }
}

#[async_trait]
impl InputGenerator for AwsInputGenerator {
    async fn generate(&self, state: &State) -> Result<Inputs> {
        if state.aws.access_key_id.is_empty() || state.aws.secret_access_key.is_empty() {
            return Err(TerraformError::MissingCredentials(
                "AWS access key ID and secret access key".into(),
            ));
        }

        let zones = retrieve_zones(self.zones.as_ref(), &state.aws.region).await?;

        let mut inputs = Inputs::from([
            ("env_id".to_string(), json!(state.env_id)),
            ("short_env_id".to_string(), json!(short_env_id(&state.env_id))),
            ("access_key".to_string(), json!(state.aws.access_key_id)),
            ("secret_key".to_string(), json!(state.aws.secret_access_key)),
            ("region".to_string(), json!(state.aws.region)),
            ("availability_zones".to_string(), json!(zones)),
        ]);

        if state.lb.is_cf() && !state.lb.domain.is_empty() {
            inputs.insert("system_domain".into(), json!(state.lb.domain));
        }

        let vars_dir = self.store.vars_dir().await?;
        write_lb_certificates(self.fs.as_ref(), &vars_dir, &state.lb, &mut inputs).await?;

        Ok(inputs)
    }
}

fn short_env_id(env_id: &str) -> String {
    env_id.chars().take(SHORT_ENV_ID_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbl_core::{Aws, Lb, LocalFs, Store};
    use tempfile::TempDir;

    struct FixedZones(Vec<String>);

    #[async_trait]
    impl ZoneRetriever for FixedZones {
        async fn zones(&self, _region: &str) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    fn state() -> State {
        State {
            env_id: "some-env-id-that-is-rather-long".into(),
            aws: Aws {
                access_key_id: "some-key".into(),
                secret_access_key: "some-secret".into(),
                region: "us-west-2".into(),
            },
            ..State::default()
        }
    }

    fn generator(dir: &TempDir, zones: Vec<&str>) -> AwsInputGenerator {
        AwsInputGenerator::new(
            Arc::new(FixedZones(zones.into_iter().map(String::from).collect())),
            Arc::new(Store::new(dir.path())),
            Arc::new(LocalFs),
        )
    }

    #[test]
    fn test_template_per_lb_type() {
        let mut state = state();
        let base = AwsTemplateGenerator.generate(&state);
        assert!(base.contains(r#"resource "aws_vpc" "vpc""#));
        assert!(!base.contains("cf_router_lb"));

        state.lb = Lb {
            lb_type: "concourse".into(),
            ..Lb::default()
        };
        let concourse = AwsTemplateGenerator.generate(&state);
        assert!(concourse.contains(r#"resource "aws_elb" "concourse_lb""#));
        assert!(concourse.contains("lb_subnets"));

        state.lb = Lb {
            lb_type: "cf".into(),
            domain: "example.com".into(),
            ..Lb::default()
        };
        let cf = AwsTemplateGenerator.generate(&state);
        assert!(cf.contains(r#"resource "aws_elb" "cf_router_lb""#));
        assert!(cf.contains(r#"resource "aws_route53_zone" "env_dns_zone""#));
        assert!(!cf.contains("concourse_lb"));
    }

    #[tokio::test]
    async fn test_inputs() {
        let dir = TempDir::new().unwrap();
        let inputs = generator(&dir, vec!["us-west-2a", "us-west-2b"])
            .generate(&state())
            .await
            .unwrap();

        assert_eq!(inputs["env_id"], json!("some-env-id-that-is-rather-long"));
        assert_eq!(inputs["short_env_id"], json!("some-env-id-that-i"));
        assert_eq!(inputs["region"], json!("us-west-2"));
        assert_eq!(inputs["availability_zones"], json!(["us-west-2a", "us-west-2b"]));
        assert!(!inputs.contains_key("system_domain"));
    }

    #[tokio::test]
    async fn test_empty_zones() {
        let dir = TempDir::new().unwrap();
        let err = generator(&dir, vec![]).generate(&state()).await.unwrap_err();
        assert_eq!(err.to_string(), "Zone list is empty");
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let dir = TempDir::new().unwrap();
        let mut state = state();
        state.aws.secret_access_key.clear();

        let err = generator(&dir, vec!["z"]).generate(&state).await.unwrap_err();
        assert!(matches!(err, TerraformError::MissingCredentials(_)));
    }
}

//! GCP templates and inputs

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

pub const CREDENTIALS_FILE: &str = "terraform-credentials.json";

#[derive(Debug, Clone, Copy, Default)]
pub struct GcpTemplateGenerator;

impl TemplateGenerator for GcpTemplateGenerator {
    fn generate(&self, state: &State) -> String {
        compose(
            templates::BASE,
            &state.lb,
            &[templates::CF_LB],
            templates::CF_DNS,
            &[templates::CONCOURSE_LB],
        )
    }
}

pub struct GcpInputGenerator {
    zones: Arc<dyn ZoneRetriever>,
    store: Arc<dyn StateStore>,
    fs: Arc<dyn FileIo>,
}

impl GcpInputGenerator {
    pub fn new(
        zones: Arc<dyn ZoneRetriever>,
        store: Arc<dyn StateStore>,
        fs: Arc<dyn FileIo>,
    ) -> Self {
        Self { zones, store, fs }
    }
}

#[async_trait]
impl InputGenerator for GcpInputGenerator {
    async fn generate(&self, state: &State) -> Result<Inputs> {
        if state.gcp.service_account_key.is_empty() {
            return Err(TerraformError::MissingCredentials(
                "GCP service account key".into(),
            ));
        }

        let zones = retrieve_zones(self.zones.as_ref(), &state.gcp.region).await?;

        let vars_dir = self.store.vars_dir().await?;
        let credentials = vars_dir.join(CREDENTIALS_FILE);
        self.fs
            .write(&credentials, state.gcp.service_account_key.as_bytes(), 0o600)
            .await?;

        let zone = if state.gcp.zone.is_empty() {
            zones[0].clone()
        } else {
            state.gcp.zone.clone()
        };

        let mut inputs = Inputs::from([
            ("env_id".to_string(), json!(state.env_id)),
            ("project_id".to_string(), json!(state.gcp.project_id)),
            ("region".to_string(), json!(state.gcp.region)),
            ("zone".to_string(), json!(zone)),
            ("availability_zones".to_string(), json!(zones)),
            (
                "credentials".to_string(),
                json!(credentials.display().to_string()),
            ),
            ("system_domain".to_string(), json!(state.lb.domain)),
        ]);

        write_lb_certificates(self.fs.as_ref(), &vars_dir, &state.lb, &mut inputs).await?;

        Ok(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{LB_CERT_FILE, LB_KEY_FILE};
    use bbl_core::{Gcp, Lb, LocalFs, Store};
    use tempfile::TempDir;

    enum Zones {
        Fixed(Vec<&'static str>),
        Failing,
    }

    #[async_trait]
    impl ZoneRetriever for Zones {
        async fn zones(&self, _region: &str) -> Result<Vec<String>> {
            match self {
                Zones::Fixed(z) => Ok(z.iter().map(|s| s.to_string()).collect()),
                Zones::Failing => Err(TerraformError::Io(std::io::Error::other(
                    "failed to get zones",
                ))),
            }
        }
    }

    fn state() -> State {
        State {
            env_id: "some-env-id".into(),
            gcp: Gcp {
                service_account_key: r#"{"type": "service_account"}"#.into(),
                project_id: "some-project-id".into(),
                region: "some-region".into(),
                ..Gcp::default()
            },
            lb: Lb {
                lb_type: "cf".into(),
                cert: "some-cert".into(),
                key: "some-key".into(),
                domain: "some-domain".into(),
                ..Lb::default()
            },
            ..State::default()
        }
    }

    fn generator(dir: &TempDir, zones: Zones) -> GcpInputGenerator {
        GcpInputGenerator::new(
            Arc::new(zones),
            Arc::new(Store::new(dir.path())),
            Arc::new(LocalFs),
        )
    }

    #[tokio::test]
    async fn test_inputs() {
        let dir = TempDir::new().unwrap();
        let inputs = generator(&dir, Zones::Fixed(vec!["zone-1", "zone-2"]))
            .generate(&state())
            .await
            .unwrap();

        let vars = dir.path().join("vars");
        let credentials = vars.join(CREDENTIALS_FILE);

        assert_eq!(inputs["env_id"], json!("some-env-id"));
        assert_eq!(inputs["project_id"], json!("some-project-id"));
        assert_eq!(inputs["region"], json!("some-region"));
        assert_eq!(inputs["zone"], json!("zone-1"));
        assert_eq!(inputs["availability_zones"], json!(["zone-1", "zone-2"]));
        assert_eq!(inputs["credentials"], json!(credentials.display().to_string()));
        assert_eq!(inputs["system_domain"], json!("some-domain"));
        assert_eq!(
            inputs["ssl_certificate"],
            json!(vars.join(LB_CERT_FILE).display().to_string())
        );
        assert_eq!(
            inputs["ssl_certificate_private_key"],
            json!(vars.join(LB_KEY_FILE).display().to_string())
        );
        assert_eq!(
            std::fs::read_to_string(credentials).unwrap(),
            r#"{"type": "service_account"}"#
        );
    }

    #[tokio::test]
    async fn test_configured_zone_wins() {
        let dir = TempDir::new().unwrap();
        let mut state = state();
        state.gcp.zone = "zone-2".into();

        let inputs = generator(&dir, Zones::Fixed(vec!["zone-1", "zone-2"]))
            .generate(&state)
            .await
            .unwrap();
        assert_eq!(inputs["zone"], json!("zone-2"));
    }

    #[tokio::test]
    async fn test_zone_retrieval_failure() {
        let dir = TempDir::new().unwrap();
        let err = generator(&dir, Zones::Failing)
            .generate(&state())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Retrieving availability zones: IO error: failed to get zones"
        );
    }

    #[tokio::test]
    async fn test_empty_zone_list() {
        let dir = TempDir::new().unwrap();
        let err = generator(&dir, Zones::Fixed(vec![]))
            .generate(&state())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Zone list is empty");
    }

    #[test]
    fn test_template() {
        let mut state = state();
        let cf = GcpTemplateGenerator.generate(&state);
        assert!(cf.contains("router_lb_backend_service"));
        assert!(cf.contains("google_dns_managed_zone"));

        state.lb = Lb::default();
        let base = GcpTemplateGenerator.generate(&state);
        assert!(base.starts_with(templates::BASE));
        assert!(!base.contains("target_pool"));
    }
}

//! Azure templates and inputs

pub mod templates;

use crate::error::{Result, TerraformError};
use crate::generator::{InputGenerator, Inputs, TemplateGenerator, compose};
use async_trait::async_trait;
use bbl_core::State;
use serde_json::json;

/// Storage account names: 3-24 lowercase alphanumerics
const SIMPLE_ENV_ID_LEN: usize = 20;

#[derive(Debug, Clone, Copy, Default)]
pub struct AzureTemplateGenerator;

impl TemplateGenerator for AzureTemplateGenerator {
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

/// Azure needs no lookups; the region is a single zone
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureInputGenerator;

#[async_trait]
impl InputGenerator for AzureInputGenerator {
    async fn generate(&self, state: &State) -> Result<Inputs> {
        let azure = &state.azure;
        if azure.client_id.is_empty() || azure.client_secret.is_empty() {
            return Err(TerraformError::MissingCredentials(
                "Azure client ID and client secret".into(),
            ));
        }

        let mut inputs = Inputs::from([
            ("env_id".to_string(), json!(state.env_id)),
            ("simple_env_id".to_string(), json!(simple_env_id(&state.env_id))),
            ("subscription_id".to_string(), json!(azure.subscription_id)),
            ("tenant_id".to_string(), json!(azure.tenant_id)),
            ("client_id".to_string(), json!(azure.client_id)),
            ("client_secret".to_string(), json!(azure.client_secret)),
            ("region".to_string(), json!(azure.region)),
        ]);

        if state.lb.is_cf() && !state.lb.domain.is_empty() {
            inputs.insert("system_domain".into(), json!(state.lb.domain));
        }

        Ok(inputs)
    }
}

fn simple_env_id(env_id: &str) -> String {
    env_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(SIMPLE_ENV_ID_LEN)
        .collect()
}

//! Template and input generation seams

use crate::error::{Result, TerraformError};
use crate::zones::ZoneRetriever;
use async_trait::async_trait;
use bbl_core::{FileIo, Lb, State};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::Path;

/// Terraform input variables, written verbatim as `terraform.tfvars.json`
pub type Inputs = BTreeMap<String, Value>;

pub const LB_CERT_FILE: &str = "lb-cert.pem";
pub const LB_KEY_FILE: &str = "lb-key.pem";
pub const LB_CHAIN_FILE: &str = "lb-chain.pem";

/// Renders the terraform template for a state
pub trait TemplateGenerator: Send + Sync {
    fn generate(&self, state: &State) -> String;
}

/// Builds the terraform input variables for a state
#[async_trait]
pub trait InputGenerator: Send + Sync {
    async fn generate(&self, state: &State) -> Result<Inputs>;
}

/// Join the base template with the fragments selected by the LB type
pub(crate) fn compose(base: &str, lb: &Lb, cf: &[&str], cf_dns: &str, concourse: &[&str]) -> String {
    let mut parts = vec![base];
    if lb.is_cf() {
        parts.extend_from_slice(cf);
        if !lb.domain.is_empty() {
            parts.push(cf_dns);
        }
    } else if lb.is_concourse() {
        parts.extend_from_slice(concourse);
    }
    parts.join("\n")
}

/// Zones for `region`; lookup failures and empty lists are both errors
pub(crate) async fn retrieve_zones(zones: &dyn ZoneRetriever, region: &str) -> Result<Vec<String>> {
    let list = zones.zones(region).await.map_err(|e| match e {
        TerraformError::ZonesUnavailable(_) => e,
        other => TerraformError::ZonesUnavailable(other.to_string()),
    })?;
    if list.is_empty() {
        return Err(TerraformError::EmptyZones);
    }
    Ok(list)
}

/// Drop the LB certificate material into `vars_dir` and reference it by path
pub(crate) async fn write_lb_certificates(
    fs: &dyn FileIo,
    vars_dir: &Path,
    lb: &Lb,
    inputs: &mut Inputs,
) -> Result<()> {
    if !lb.has_certificate() {
        return Ok(());
    }

    let cert = vars_dir.join(LB_CERT_FILE);
    fs.write(&cert, lb.cert.as_bytes(), 0o600).await?;
    inputs.insert("ssl_certificate".into(), json!(cert.display().to_string()));

    let key = vars_dir.join(LB_KEY_FILE);
    fs.write(&key, lb.key.as_bytes(), 0o600).await?;
    inputs.insert(
        "ssl_certificate_private_key".into(),
        json!(key.display().to_string()),
    );

    if !lb.chain.is_empty() {
        let chain = vars_dir.join(LB_CHAIN_FILE);
        fs.write(&chain, lb.chain.as_bytes(), 0o600).await?;
        inputs.insert(
            "ssl_certificate_chain".into(),
            json!(chain.display().to_string()),
        );
    }

    Ok(())
}

//! Global flags and their merge into the loaded state
//!
//! Every flag can also come from a `BBL_*` environment variable. Secrets are
//! never persisted, so credentials have to be supplied on each invocation
//! that talks to the IaaS.

use anyhow::{Context, bail};
use bbl_core::{Iaas, STATE_FILE, State};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Directory containing the bbl state
    #[arg(short = 's', long, global = true, env = "BBL_STATE_DIR", default_value = ".")]
    pub state_dir: PathBuf,

    /// Print debug output
    #[arg(short = 'd', long, global = true, env = "BBL_DEBUG")]
    pub debug: bool,

    /// IAAS to deploy your BOSH director onto: aws, gcp or azure
    #[arg(long, global = true, env = "BBL_IAAS")]
    pub iaas: Option<String>,

    /// AWS access key id
    #[arg(long, global = true, env = "BBL_AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub aws_access_key_id: Option<String>,

    /// AWS secret access key
    #[arg(long, global = true, env = "BBL_AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub aws_secret_access_key: Option<String>,

    /// AWS region
    #[arg(long, global = true, env = "BBL_AWS_REGION")]
    pub aws_region: Option<String>,

    /// GCP service account key, as a path or as JSON contents
    #[arg(long, global = true, env = "BBL_GCP_SERVICE_ACCOUNT_KEY", hide_env_values = true)]
    pub gcp_service_account_key: Option<String>,

    /// GCP project id; read from the service account key when omitted
    #[arg(long, global = true, env = "BBL_GCP_PROJECT_ID")]
    pub gcp_project_id: Option<String>,

    /// GCP region
    #[arg(long, global = true, env = "BBL_GCP_REGION")]
    pub gcp_region: Option<String>,

    /// GCP zone; defaults to the first zone of the region
    #[arg(long, global = true, env = "BBL_GCP_ZONE")]
    pub gcp_zone: Option<String>,

    /// Azure subscription id
    #[arg(long, global = true, env = "BBL_AZURE_SUBSCRIPTION_ID")]
    pub azure_subscription_id: Option<String>,

    /// Azure tenant id
    #[arg(long, global = true, env = "BBL_AZURE_TENANT_ID")]
    pub azure_tenant_id: Option<String>,

    /// Azure client id
    #[arg(long, global = true, env = "BBL_AZURE_CLIENT_ID")]
    pub azure_client_id: Option<String>,

    /// Azure client secret
    #[arg(long, global = true, env = "BBL_AZURE_CLIENT_SECRET", hide_env_values = true)]
    pub azure_client_secret: Option<String>,

    /// Azure region
    #[arg(long, global = true, env = "BBL_AZURE_REGION")]
    pub azure_region: Option<String>,

    /// Local checkout of jumpbox-deployment to seed the state dir from
    #[arg(long, global = true, env = "BBL_JUMPBOX_DEPLOYMENT_SOURCE")]
    pub jumpbox_deployment_source: Option<PathBuf>,

    /// Local checkout of bosh-deployment to seed the state dir from
    #[arg(long, global = true, env = "BBL_BOSH_DEPLOYMENT_SOURCE")]
    pub bosh_deployment_source: Option<PathBuf>,

    /// terraform binary
    #[arg(long, global = true, env = "BBL_TERRAFORM_PATH", default_value = "terraform")]
    pub terraform_path: PathBuf,

    /// bosh binary
    #[arg(long, global = true, env = "BBL_BOSH_PATH", default_value = "bosh")]
    pub bosh_path: PathBuf,
}

fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn set(field: &mut String, value: &Option<String>) {
    if let Some(v) = given(value) {
        *field = v.to_string();
    }
}

fn set_region(field: &mut String, value: &Option<String>, existing: bool) -> anyhow::Result<()> {
    let Some(region) = given(value) else {
        return Ok(());
    };
    if existing && !field.is_empty() && field.as_str() != region {
        bail!(
            "The region cannot be changed for an existing environment. The current region is {}.",
            field
        );
    }
    *field = region.to_string();
    Ok(())
}

/// Accept either a path to the key file or the JSON itself
fn read_service_account_key(value: &str) -> anyhow::Result<String> {
    let path = Path::new(value);
    let contents = if path.is_file() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Reading service account key: {}", path.display()))?
    } else {
        value.to_string()
    };

    serde_json::from_str::<serde_json::Value>(&contents)
        .context("Unmarshalling service account key (must be valid json)")?;
    Ok(contents)
}

fn project_id_from_key(key: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(key).ok()?;
    json.get("project_id")?.as_str().map(str::to_string)
}

/// Overlay the flags onto the loaded state
pub fn merge(mut state: State, args: &GlobalArgs) -> anyhow::Result<State> {
    let existing = !state.env_id.is_empty();

    if let Some(name) = given(&args.iaas) {
        let iaas: Iaas = name.parse()?;
        match state.iaas {
            Some(current) if current != iaas => bail!(
                "The iaas type cannot be changed for an existing environment. The current iaas type is {}.",
                current
            ),
            _ => state.iaas = Some(iaas),
        }
    }

    set(&mut state.aws.access_key_id, &args.aws_access_key_id);
    set(&mut state.aws.secret_access_key, &args.aws_secret_access_key);
    set_region(&mut state.aws.region, &args.aws_region, existing)?;

    if let Some(value) = given(&args.gcp_service_account_key) {
        state.gcp.service_account_key = read_service_account_key(value)?;
        if let Some(project_id) = project_id_from_key(&state.gcp.service_account_key) {
            state.gcp.project_id = project_id;
        }
    }
    set(&mut state.gcp.project_id, &args.gcp_project_id);
    set_region(&mut state.gcp.region, &args.gcp_region, existing)?;
    set(&mut state.gcp.zone, &args.gcp_zone);

    set(&mut state.azure.subscription_id, &args.azure_subscription_id);
    set(&mut state.azure.tenant_id, &args.azure_tenant_id);
    set(&mut state.azure.client_id, &args.azure_client_id);
    set(&mut state.azure.client_secret, &args.azure_client_secret);
    set_region(&mut state.azure.region, &args.azure_region, existing)?;

    Ok(state)
}

/// The IaaS recorded in the state, for verbs that only read outputs
pub fn require_iaas(state: &State) -> anyhow::Result<Iaas> {
    match state.iaas {
        Some(iaas) => Ok(iaas),
        None => bail!("--iaas [gcp, aws, azure] must be provided or BBL_IAAS must be set"),
    }
}

/// The IaaS plus every credential needed to talk to it
pub fn validate_iaas(state: &State) -> anyhow::Result<Iaas> {
    let iaas = require_iaas(state)?;

    let required: Vec<(&str, &str)> = match iaas {
        Iaas::Aws => vec![
            (state.aws.access_key_id.as_str(), "AWS access key ID must be provided (--aws-access-key-id or BBL_AWS_ACCESS_KEY_ID)"),
            (state.aws.secret_access_key.as_str(), "AWS secret access key must be provided (--aws-secret-access-key or BBL_AWS_SECRET_ACCESS_KEY)"),
            (state.aws.region.as_str(), "AWS region must be provided (--aws-region or BBL_AWS_REGION)"),
        ],
        Iaas::Gcp => vec![
            (state.gcp.service_account_key.as_str(), "GCP service account key must be provided (--gcp-service-account-key or BBL_GCP_SERVICE_ACCOUNT_KEY)"),
            (state.gcp.project_id.as_str(), "GCP project ID must be provided (--gcp-project-id or BBL_GCP_PROJECT_ID)"),
            (state.gcp.region.as_str(), "GCP region must be provided (--gcp-region or BBL_GCP_REGION)"),
        ],
        Iaas::Azure => vec![
            (state.azure.subscription_id.as_str(), "Azure subscription id must be provided (--azure-subscription-id or BBL_AZURE_SUBSCRIPTION_ID)"),
            (state.azure.tenant_id.as_str(), "Azure tenant id must be provided (--azure-tenant-id or BBL_AZURE_TENANT_ID)"),
            (state.azure.client_id.as_str(), "Azure client id must be provided (--azure-client-id or BBL_AZURE_CLIENT_ID)"),
            (state.azure.client_secret.as_str(), "Azure client secret must be provided (--azure-client-secret or BBL_AZURE_CLIENT_SECRET)"),
            (state.azure.region.as_str(), "Azure region must be provided (--azure-region or BBL_AZURE_REGION)"),
        ],
    };

    let missing: Vec<&str> = required
        .into_iter()
        .filter(|(value, _)| value.is_empty())
        .map(|(_, message)| message)
        .collect();
    if !missing.is_empty() {
        bail!("{}", missing.join("\n"));
    }

    Ok(iaas)
}

/// Fail unless an environment has been created in `state_dir`
pub fn ensure_state_file(state_dir: &Path) -> anyhow::Result<()> {
    if !state_dir.join(STATE_FILE).is_file() {
        bail!(
            "bbl-state.json not found in {}, ensure you're running this command in the proper state directory or create a new environment with bbl up",
            state_dir.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn aws_args() -> GlobalArgs {
        GlobalArgs {
            iaas: Some("aws".into()),
            aws_access_key_id: Some("some-key".into()),
            aws_secret_access_key: Some("some-secret".into()),
            aws_region: Some("us-west-1".into()),
            ..GlobalArgs::default()
        }
    }

    #[test]
    fn test_merge_sets_iaas_and_credentials() {
        let state = merge(State::default(), &aws_args()).unwrap();

        assert_eq!(state.iaas, Some(Iaas::Aws));
        assert_eq!(state.aws.access_key_id, "some-key");
        assert_eq!(state.aws.region, "us-west-1");
        assert_eq!(validate_iaas(&state).unwrap(), Iaas::Aws);
    }

    #[test]
    fn test_iaas_cannot_change() {
        let state = State {
            iaas: Some(Iaas::Gcp),
            ..State::default()
        };

        let err = merge(state, &aws_args()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The iaas type cannot be changed for an existing environment. The current iaas type is gcp."
        );
    }

    #[test]
    fn test_unknown_iaas() {
        let args = GlobalArgs {
            iaas: Some("openstack".into()),
            ..GlobalArgs::default()
        };
        let err = merge(State::default(), &args).unwrap_err();
        assert!(err.to_string().contains("Unknown IAAS \"openstack\""));
    }

    #[test]
    fn test_region_cannot_change_for_existing_environment() {
        let mut state = State {
            env_id: "some-env".into(),
            iaas: Some(Iaas::Aws),
            ..State::default()
        };
        state.aws.region = "us-east-1".into();

        let err = merge(state.clone(), &aws_args()).unwrap_err();
        assert!(err.to_string().contains("The current region is us-east-1."));

        state.env_id.clear();
        let merged = merge(state, &aws_args()).unwrap();
        assert_eq!(merged.aws.region, "us-west-1");
    }

    #[test]
    fn test_gcp_key_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("key.json");
        std::fs::write(&path, r#"{"project_id": "some-project"}"#).unwrap();

        let args = GlobalArgs {
            iaas: Some("gcp".into()),
            gcp_service_account_key: Some(path.display().to_string()),
            gcp_region: Some("us-east1".into()),
            ..GlobalArgs::default()
        };
        let state = merge(State::default(), &args).unwrap();

        assert_eq!(state.gcp.service_account_key, r#"{"project_id": "some-project"}"#);
        assert_eq!(state.gcp.project_id, "some-project");
        assert_eq!(validate_iaas(&state).unwrap(), Iaas::Gcp);
    }

    #[test]
    fn test_gcp_key_must_be_json() {
        let args = GlobalArgs {
            gcp_service_account_key: Some("not-json".into()),
            ..GlobalArgs::default()
        };
        let err = merge(State::default(), &args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unmarshalling service account key (must be valid json)"
        );
    }

    #[test]
    fn test_validate_reports_every_missing_credential() {
        let state = State {
            iaas: Some(Iaas::Azure),
            ..State::default()
        };
        let err = validate_iaas(&state).unwrap_err().to_string();

        assert_eq!(err.lines().count(), 5);
        assert!(err.starts_with("Azure subscription id must be provided"));
    }

    #[test]
    fn test_validate_requires_iaas() {
        let err = validate_iaas(&State::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "--iaas [gcp, aws, azure] must be provided or BBL_IAAS must be set"
        );
    }

    #[test]
    fn test_ensure_state_file() {
        let dir = tempdir().unwrap();
        assert!(ensure_state_file(dir.path()).is_err());

        std::fs::write(dir.path().join(STATE_FILE), "{}").unwrap();
        assert!(ensure_state_file(dir.path()).is_ok());
    }
}

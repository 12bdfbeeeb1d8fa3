//! Read-only verbs that print one value from the state

use crate::commands::load_state;
use crate::config::{self, GlobalArgs};
use anyhow::bail;
use bbl_bosh::{JUMPBOX_KEY_FILE, jumpbox_proxy, vars};
use bbl_core::{FileIo, LocalFs, State, StateStore, Store};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    DirectorAddress,
    DirectorUsername,
    DirectorPassword,
    DirectorCaCert,
    JumpboxAddress,
    EnvId,
    SshKey,
    LatestError,
}

impl Query {
    fn label(&self) -> &'static str {
        match self {
            Query::DirectorAddress => "director address",
            Query::DirectorUsername => "director username",
            Query::DirectorPassword => "director password",
            Query::DirectorCaCert => "director ca cert",
            Query::JumpboxAddress => "jumpbox address",
            Query::EnvId => "environment id",
            Query::SshKey => "ssh key",
            Query::LatestError => "latest error",
        }
    }

    fn is_director(&self) -> bool {
        matches!(
            self,
            Query::DirectorAddress
                | Query::DirectorUsername
                | Query::DirectorPassword
                | Query::DirectorCaCert
        )
    }
}

pub async fn handle(global: &GlobalArgs, query: Query) -> anyhow::Result<()> {
    config::ensure_state_file(&global.state_dir)?;
    let state = load_state(global).await?;
    println!("{}", value(query, &state)?);
    Ok(())
}

/// The requested value, or an error when the state does not hold it
pub fn value(query: Query, state: &State) -> anyhow::Result<String> {
    if query.is_director() && state.no_director {
        bail!("Error BBL does not manage this director.");
    }

    let found = match query {
        Query::DirectorAddress => state.bosh.director_address.clone(),
        Query::DirectorUsername => state.bosh.director_username.clone(),
        Query::DirectorPassword => state.bosh.director_password.clone(),
        Query::DirectorCaCert => state.bosh.director_ssl_ca.clone(),
        Query::JumpboxAddress => state.jumpbox.url.clone(),
        Query::EnvId => state.env_id.clone(),
        Query::SshKey => vars::jumpbox_ssh_key(&state.jumpbox.variables)?,
        Query::LatestError => return Ok(state.latest_tf_output.clone()),
    };

    if found.is_empty() {
        bail!(
            "Could not retrieve {}, please make sure you are targeting the proper state dir.",
            query.label()
        );
    }
    Ok(found)
}

/// `bbl print-env`: shell exports for targeting the director
pub async fn print_env(global: &GlobalArgs) -> anyhow::Result<()> {
    config::ensure_state_file(&global.state_dir)?;
    let state = load_state(global).await?;

    let key = vars::jumpbox_ssh_key(&state.jumpbox.variables)?;
    let proxy = if state.jumpbox.url.is_empty() || key.is_empty() {
        None
    } else {
        let store = Store::new(&global.state_dir);
        let path = store.bbl_dir().await?.join(JUMPBOX_KEY_FILE);
        write_private_key(&path, &key).await?;
        Some(jumpbox_proxy(&state.jumpbox.url, &path))
    };

    for line in env_lines(&state, proxy.as_deref())? {
        println!("{}", line);
    }
    Ok(())
}

async fn write_private_key(path: &Path, key: &str) -> anyhow::Result<()> {
    LocalFs.write(path, key.as_bytes(), 0o600).await?;
    Ok(())
}

pub fn env_lines(state: &State, all_proxy: Option<&str>) -> anyhow::Result<Vec<String>> {
    if state.no_director {
        bail!("Error BBL does not manage this director.");
    }

    let mut lines = vec![
        format!("export BOSH_CLIENT={}", value(Query::DirectorUsername, state)?),
        format!("export BOSH_CLIENT_SECRET={}", value(Query::DirectorPassword, state)?),
        format!("export BOSH_ENVIRONMENT={}", value(Query::DirectorAddress, state)?),
        format!("export BOSH_CA_CERT='{}'", value(Query::DirectorCaCert, state)?),
    ];
    if let Some(proxy) = all_proxy {
        lines.push(format!("export BOSH_ALL_PROXY={}", proxy));
    }
    Ok(lines)
}

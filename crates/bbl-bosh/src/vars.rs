//! Credentials extracted from bosh vars-stores

use crate::error::{BoshError, Result};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

pub const DIRECTOR_USERNAME: &str = "admin";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorCredentials {
    pub password: String,
    pub ssl_ca: String,
    pub ssl_certificate: String,
    pub ssl_private_key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DirectorVars {
    admin_password: String,
    director_ssl: Certificate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Certificate {
    ca: String,
    certificate: String,
    private_key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JumpboxVars {
    jumpbox_ssh: SshKey,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SshKey {
    private_key: String,
}

fn parse<T: Default + for<'de> Deserialize<'de>>(vars_store: &str) -> Result<T> {
    if vars_store.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(vars_store).map_err(|e| BoshError::VarsStoreParse(e.to_string()))
}

/// Admin password and director TLS material from the director vars-store
pub fn director_credentials(vars_store: &str) -> Result<DirectorCredentials> {
    let vars: DirectorVars = parse(vars_store)?;
    Ok(DirectorCredentials {
        password: vars.admin_password,
        ssl_ca: vars.director_ssl.ca,
        ssl_certificate: vars.director_ssl.certificate,
        ssl_private_key: vars.director_ssl.private_key,
    })
}

/// The SSH key bosh generated for the `jumpbox` user
pub fn jumpbox_ssh_key(vars_store: &str) -> Result<String> {
    let vars: JumpboxVars = parse(vars_store)?;
    Ok(vars.jumpbox_ssh.private_key)
}

/// Drop `jumpbox_ssh` so the next create-env generates a fresh key
pub fn without_jumpbox_ssh(vars_store: &str) -> Result<String> {
    if vars_store.trim().is_empty() {
        return Ok(String::new());
    }
    let mut vars: Mapping =
        serde_yaml::from_str(vars_store).map_err(|e| BoshError::VarsStoreParse(e.to_string()))?;
    vars.remove(Value::from("jumpbox_ssh"));
    Ok(serde_yaml::to_string(&vars)?)
}

//! Talking to a running director through the bosh CLI

use crate::error::{BoshError, Result};
use async_trait::async_trait;
use bbl_core::{CommandRunner, Invocation};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Jumpbox private key, written under `.bbl` when a tunnel is needed
pub const JUMPBOX_KEY_FILE: &str = "jumpbox.key";

/// `BOSH_ALL_PROXY` value that tunnels through the jumpbox over SSH
pub fn jumpbox_proxy(jumpbox_url: &str, private_key: &Path) -> String {
    format!(
        "ssh+socks5://jumpbox@{}?private-key={}",
        jumpbox_url,
        private_key.display()
    )
}

/// Where and how to reach a director
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorConnection {
    pub address: String,
    pub username: String,
    pub password: String,
    pub ca_cert: String,
    /// `BOSH_ALL_PROXY` value when the director is only reachable via the jumpbox
    pub all_proxy: Option<String>,
}

#[async_trait]
pub trait DirectorClient: Send + Sync {
    async fn update_cloud_config(&self, cloud_config: &str) -> Result<()>;
}

pub trait DirectorClientProvider: Send + Sync {
    fn client(&self, connection: DirectorConnection) -> Box<dyn DirectorClient>;
}

/// Provides `bosh`-CLI backed clients
pub struct CliClientProvider {
    runner: Arc<dyn CommandRunner>,
    bosh_path: PathBuf,
}

impl CliClientProvider {
    pub fn new(runner: Arc<dyn CommandRunner>, bosh_path: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            bosh_path: bosh_path.into(),
        }
    }
}

impl DirectorClientProvider for CliClientProvider {
    fn client(&self, connection: DirectorConnection) -> Box<dyn DirectorClient> {
        Box::new(CliClient {
            runner: self.runner.clone(),
            bosh_path: self.bosh_path.clone(),
            connection,
        })
    }
}

pub struct CliClient {
    runner: Arc<dyn CommandRunner>,
    bosh_path: PathBuf,
    connection: DirectorConnection,
}

impl CliClient {
    fn invocation(&self) -> Invocation {
        let conn = &self.connection;
        let mut invocation = Invocation::new(&self.bosh_path)
            .arg("--non-interactive")
            .env("BOSH_ENVIRONMENT", &conn.address)
            .env("BOSH_CLIENT", &conn.username)
            .env("BOSH_CLIENT_SECRET", &conn.password)
            .env("BOSH_CA_CERT", &conn.ca_cert);
        if let Some(proxy) = &conn.all_proxy {
            invocation = invocation.env("BOSH_ALL_PROXY", proxy);
        }
        invocation
    }
}

#[async_trait]
impl DirectorClient for CliClient {
    async fn update_cloud_config(&self, cloud_config: &str) -> Result<()> {
        let mut file = tempfile::Builder::new()
            .prefix("cloud-config")
            .suffix(".yml")
            .tempfile()?;
        file.write_all(cloud_config.as_bytes())?;
        file.flush()?;

        let invocation = self
            .invocation()
            .arg("update-cloud-config")
            .arg(file.path().display().to_string());

        tracing::debug!("Running: {}", invocation.display());

        let output = self.runner.run(&invocation).await?;
        if !output.success() {
            tracing::debug!("{}", output.combined());
            return Err(BoshError::CommandFailed {
                command: "update-cloud-config".into(),
                status: output.status_text(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbl_core::CommandOutput;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingRunner {
        exit_code: i32,
        seen: Mutex<Vec<(Invocation, String)>>,
    }

    #[async_trait]
    impl CommandRunner for CapturingRunner {
        async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
            let file = invocation.args.last().cloned().unwrap_or_default();
            let contents = std::fs::read_to_string(&file).unwrap_or_default();
            self.seen
                .lock()
                .unwrap()
                .push((invocation.clone(), contents));
            Ok(CommandOutput {
                exit_code: Some(self.exit_code),
                ..CommandOutput::default()
            })
        }
    }

    fn connection() -> DirectorConnection {
        DirectorConnection {
            address: "https://10.0.0.6:25555".into(),
            username: "admin".into(),
            password: "some-password".into(),
            ca_cert: "some-ca".into(),
            all_proxy: None,
        }
    }

    #[test]
    fn test_jumpbox_proxy() {
        assert_eq!(
            jumpbox_proxy("35.1.2.3:22", Path::new("/state/.bbl/jumpbox.key")),
            "ssh+socks5://jumpbox@35.1.2.3:22?private-key=/state/.bbl/jumpbox.key"
        );
    }

    #[tokio::test]
    async fn test_update_cloud_config() {
        let runner = Arc::new(CapturingRunner::default());
        let client = CliClientProvider::new(runner.clone(), "bosh").client(connection());

        client.update_cloud_config("azs: []\n").await.unwrap();

        let seen = runner.seen.lock().unwrap();
        let (invocation, contents) = &seen[0];
        assert_eq!(contents, "azs: []\n");
        assert_eq!(invocation.args[1], "update-cloud-config");
        assert!(invocation.env.contains(&(
            "BOSH_ENVIRONMENT".to_string(),
            "https://10.0.0.6:25555".to_string()
        )));
        assert!(
            invocation
                .env
                .contains(&("BOSH_CLIENT_SECRET".to_string(), "some-password".to_string()))
        );
        assert!(!invocation.env.iter().any(|(k, _)| k == "BOSH_ALL_PROXY"));
    }

    #[tokio::test]
    async fn test_update_cloud_config_failure() {
        let runner = Arc::new(CapturingRunner {
            exit_code: 1,
            ..CapturingRunner::default()
        });
        let mut conn = connection();
        conn.all_proxy = Some("ssh+socks5://jumpbox@1.2.3.4:22".into());
        let client = CliClientProvider::new(runner.clone(), "bosh").client(conn);

        let err = client.update_cloud_config("").await.unwrap_err();

        assert_eq!(err.to_string(), "Run bosh update-cloud-config: exit status 1");
        assert!(
            runner.seen.lock().unwrap()[0]
                .0
                .env
                .iter()
                .any(|(k, _)| k == "BOSH_ALL_PROXY")
        );
    }
}

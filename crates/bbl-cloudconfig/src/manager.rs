//! Cloud-config manager
//!
//! Writes the base cloud-config and the generated ops file into
//! `.bbl/cloudconfig`, interpolates them with the bosh CLI and pushes the
//! result to the director.

use crate::base::{BASE_CLOUD_CONFIG, CLOUD_CONFIG_FILE, OPS_FILE};
use crate::error::{CloudConfigError, Result};
use crate::ops::OpsGenerator;
use bbl_bosh::{
    DirectorClientProvider, DirectorConnection, JUMPBOX_KEY_FILE, jumpbox_proxy, vars,
};
use bbl_core::{CommandRunner, FileIo, Invocation, State, StateStore, StepLogger};
use std::path::PathBuf;
use std::sync::Arc;

pub struct Manager {
    runner: Arc<dyn CommandRunner>,
    store: Arc<dyn StateStore>,
    fs: Arc<dyn FileIo>,
    ops: Arc<dyn OpsGenerator>,
    clients: Arc<dyn DirectorClientProvider>,
    logger: Arc<dyn StepLogger>,
    bosh_path: PathBuf,
}

impl Manager {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        store: Arc<dyn StateStore>,
        fs: Arc<dyn FileIo>,
        ops: Arc<dyn OpsGenerator>,
        clients: Arc<dyn DirectorClientProvider>,
        logger: Arc<dyn StepLogger>,
    ) -> Self {
        Self {
            runner,
            store,
            fs,
            ops,
            clients,
            logger,
            bosh_path: PathBuf::from("bosh"),
        }
    }

    pub fn with_bosh_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.bosh_path = path.into();
        self
    }

    /// Render the full cloud-config for `state`
    pub async fn generate(&self, state: &State) -> Result<String> {
        let dir = self.store.cloud_config_dir().await?;
        let base_path = dir.join(CLOUD_CONFIG_FILE);
        let ops_path = dir.join(OPS_FILE);

        self.fs
            .write(&base_path, BASE_CLOUD_CONFIG.as_bytes(), 0o644)
            .await?;

        let ops = self.ops.generate(state).await?;
        self.fs.write(&ops_path, ops.as_bytes(), 0o644).await?;

        let invocation = Invocation::new(&self.bosh_path)
            .arg("interpolate")
            .arg(base_path.display().to_string())
            .arg("-o")
            .arg(ops_path.display().to_string())
            .current_dir(&dir);

        tracing::debug!("Running: {}", invocation.display());

        let output = self.runner.run(&invocation).await?;
        if !output.success() {
            tracing::debug!("{}", output.combined());
            return Err(CloudConfigError::InterpolateFailed(output.status_text()));
        }

        Ok(output.stdout)
    }

    /// Generate the cloud-config and apply it to the director
    pub async fn update(&self, state: &State) -> Result<()> {
        self.logger.step("generating cloud config");
        let cloud_config = self.generate(state).await?;

        self.logger.step("applying cloud config");
        let connection = DirectorConnection {
            address: state.bosh.director_address.clone(),
            username: state.bosh.director_username.clone(),
            password: state.bosh.director_password.clone(),
            ca_cert: state.bosh.director_ssl_ca.clone(),
            all_proxy: self.tunnel(state).await?,
        };

        self.clients
            .client(connection)
            .update_cloud_config(&cloud_config)
            .await?;
        Ok(())
    }

    /// `BOSH_ALL_PROXY` tunnelling through the jumpbox, when there is one
    async fn tunnel(&self, state: &State) -> Result<Option<String>> {
        if state.jumpbox.url.is_empty() {
            return Ok(None);
        }

        let key = vars::jumpbox_ssh_key(&state.jumpbox.variables)?;
        if key.is_empty() {
            return Ok(None);
        }

        let path = self.store.bbl_dir().await?.join(JUMPBOX_KEY_FILE);
        self.fs.write(&path, key.as_bytes(), 0o600).await?;

        Ok(Some(jumpbox_proxy(&state.jumpbox.url, &path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcp::GcpOpsGenerator;
    use crate::fakes::FixedOutputs;
    use async_trait::async_trait;
    use bbl_bosh::DirectorClient;
    use bbl_core::{CommandOutput, LocalFs, Store};
    use bbl_terraform::Outputs;
    use std::io;
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBosh {
        exit_code: i32,
        seen: Mutex<Vec<Invocation>>,
    }

    #[async_trait]
    impl CommandRunner for FakeBosh {
        async fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
            self.seen.lock().unwrap().push(invocation.clone());
            Ok(CommandOutput {
                exit_code: Some(self.exit_code),
                stdout: "some-cloud-config".into(),
                stderr: String::new(),
            })
        }
    }

    #[derive(Default)]
    struct Director {
        seen: Arc<Mutex<Vec<(DirectorConnection, String)>>>,
    }

    struct RecordingClient {
        connection: DirectorConnection,
        seen: Arc<Mutex<Vec<(DirectorConnection, String)>>>,
    }

    #[async_trait]
    impl DirectorClient for RecordingClient {
        async fn update_cloud_config(&self, cloud_config: &str) -> bbl_bosh::Result<()> {
            self.seen
                .lock()
                .unwrap()
                .push((self.connection.clone(), cloud_config.to_string()));
            Ok(())
        }
    }

    impl DirectorClientProvider for Director {
        fn client(&self, connection: DirectorConnection) -> Box<dyn DirectorClient> {
            Box::new(RecordingClient {
                connection,
                seen: self.seen.clone(),
            })
        }
    }

    #[derive(Default)]
    struct Steps(Mutex<Vec<String>>);

    impl StepLogger for Steps {
        fn step(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }

        fn println(&self, _message: &str) {}
    }

    struct UnwritableFs;

    #[async_trait]
    impl FileIo for UnwritableFs {
        async fn read_to_string(&self, path: &Path) -> io::Result<String> {
            LocalFs.read_to_string(path).await
        }

        async fn write(&self, _path: &Path, _contents: &[u8], _mode: u32) -> io::Result<()> {
            Err(io::Error::other("failed to write"))
        }

        async fn exists(&self, path: &Path) -> bool {
            LocalFs.exists(path).await
        }

        async fn remove_file(&self, path: &Path) -> io::Result<()> {
            LocalFs.remove_file(path).await
        }

        async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            LocalFs.create_dir_all(path).await
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        bosh: Arc<FakeBosh>,
        director: Arc<Director>,
        steps: Arc<Steps>,
    }

    impl Fixture {
        fn new(exit_code: i32) -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
                bosh: Arc::new(FakeBosh {
                    exit_code,
                    ..FakeBosh::default()
                }),
                director: Arc::new(Director::default()),
                steps: Arc::new(Steps::default()),
            }
        }

        fn manager(&self, fs: Arc<dyn FileIo>) -> Manager {
            let ops = GcpOpsGenerator::new(Arc::new(FixedOutputs(Outputs::default())));
            Manager::new(
                self.bosh.clone(),
                Arc::new(Store::new(self.dir.path())),
                fs,
                Arc::new(ops),
                self.director.clone(),
                self.steps.clone(),
            )
        }

        fn cloud_config_dir(&self) -> PathBuf {
            self.dir.path().join(".bbl").join("cloudconfig")
        }
    }

    fn state() -> State {
        let mut state = State::default();
        state.gcp.zones = vec!["us-east1-b".into()];
        state.bosh.director_address = "https://10.0.0.6:25555".into();
        state.bosh.director_username = "admin".into();
        state.bosh.director_password = "some-password".into();
        state.bosh.director_ssl_ca = "some-ca".into();
        state
    }

    #[tokio::test]
    async fn test_generate_interpolates_in_cloud_config_dir() {
        let fixture = Fixture::new(0);
        let manager = fixture.manager(Arc::new(LocalFs));

        let cloud_config = manager.generate(&state()).await.unwrap();

        assert_eq!(cloud_config, "some-cloud-config");

        let dir = fixture.cloud_config_dir();
        let base = std::fs::read_to_string(dir.join("cloud-config.yml")).unwrap();
        assert_eq!(base, BASE_CLOUD_CONFIG);
        let ops = std::fs::read_to_string(dir.join("ops.yml")).unwrap();
        assert!(ops.starts_with(crate::gcp::BASE_OPS));
        assert!(ops.contains("zone: us-east1-b"));

        let seen = fixture.bosh.seen.lock().unwrap();
        assert_eq!(seen[0].program, PathBuf::from("bosh"));
        assert_eq!(
            seen[0].args,
            vec![
                "interpolate".to_string(),
                dir.join("cloud-config.yml").display().to_string(),
                "-o".to_string(),
                dir.join("ops.yml").display().to_string(),
            ]
        );
        assert_eq!(seen[0].working_dir, Some(dir));
    }

    #[tokio::test]
    async fn test_generate_write_failure() {
        let fixture = Fixture::new(0);
        let manager = fixture.manager(Arc::new(UnwritableFs));

        let err = manager.generate(&state()).await.unwrap_err();

        assert_eq!(err.to_string(), "IO error: failed to write");
        assert!(fixture.bosh.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_interpolate_failure() {
        let fixture = Fixture::new(1);
        let manager = fixture.manager(Arc::new(LocalFs));

        let err = manager.generate(&state()).await.unwrap_err();
        assert_eq!(err.to_string(), "Run bosh interpolate: exit status 1");
    }

    #[tokio::test]
    async fn test_update_pushes_to_director() {
        let fixture = Fixture::new(0);
        let manager = fixture.manager(Arc::new(LocalFs));

        manager.update(&state()).await.unwrap();

        assert_eq!(
            *fixture.steps.0.lock().unwrap(),
            vec!["generating cloud config", "applying cloud config"]
        );

        let seen = fixture.director.seen.lock().unwrap();
        let (connection, cloud_config) = &seen[0];
        assert_eq!(cloud_config, "some-cloud-config");
        assert_eq!(connection.address, "https://10.0.0.6:25555");
        assert_eq!(connection.username, "admin");
        assert_eq!(connection.password, "some-password");
        assert_eq!(connection.ca_cert, "some-ca");
        assert_eq!(connection.all_proxy, None);
    }

    #[tokio::test]
    async fn test_update_tunnels_through_jumpbox() {
        let fixture = Fixture::new(0);
        let manager = fixture.manager(Arc::new(LocalFs));
        let mut state = state();
        state.jumpbox.url = "35.1.2.3:22".into();
        state.jumpbox.variables = "jumpbox_ssh:\n  private_key: some-key\n".into();

        manager.update(&state).await.unwrap();

        let key_path = fixture.dir.path().join(".bbl").join("jumpbox.key");
        assert_eq!(std::fs::read_to_string(&key_path).unwrap(), "some-key");

        let seen = fixture.director.seen.lock().unwrap();
        assert_eq!(
            seen[0].0.all_proxy,
            Some(format!(
                "ssh+socks5://jumpbox@35.1.2.3:22?private-key={}",
                key_path.display()
            ))
        );
    }

    #[tokio::test]
    async fn test_update_stops_when_generate_fails() {
        let fixture = Fixture::new(1);
        let manager = fixture.manager(Arc::new(LocalFs));

        assert!(manager.update(&state()).await.is_err());
        assert_eq!(*fixture.steps.0.lock().unwrap(), vec!["generating cloud config"]);
        assert!(fixture.director.seen.lock().unwrap().is_empty());
    }
}

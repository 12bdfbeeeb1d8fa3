//! State store
//!
//! Owns `<state-dir>/bbl-state.json` and the auxiliary directories that
//! live next to it.

use crate::error::{Result, StateError};
use crate::fs::{FileIo, LocalFs};
use crate::state::State;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const STATE_VERSION: u32 = 12;
pub const OLDEST_SUPPORTED_VERSION: u32 = 3;
pub const STATE_FILE: &str = "bbl-state.json";

const STATE_FILE_MODE: u32 = 0o644;
const BBL_DIR: &str = ".bbl";
const CLOUD_CONFIG_DIR: &str = "cloudconfig";
const VARS_DIR: &str = "vars";
const TERRAFORM_DIR: &str = "terraform";

/// Source of environment identities
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// What pipeline components need from the store
#[async_trait]
pub trait StateStore: Send + Sync {
    /// The environment directory holding the state file and scripts
    fn state_dir(&self) -> &Path;

    async fn set(&self, state: &State) -> Result<()>;

    async fn bbl_dir(&self) -> Result<PathBuf>;

    async fn cloud_config_dir(&self) -> Result<PathBuf>;

    async fn vars_dir(&self) -> Result<PathBuf>;

    async fn terraform_dir(&self) -> Result<PathBuf>;

    /// `<state-dir>/<name>`, e.g. `jumpbox-deployment`
    async fn deployment_dir(&self, name: &str) -> Result<PathBuf>;
}

pub struct Store {
    dir: PathBuf,
    version: u32,
    fs: Arc<dyn FileIo>,
    ids: Arc<dyn IdGenerator>,
}

impl Store {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_capabilities(dir, Arc::new(LocalFs), Arc::new(UuidGenerator))
    }

    pub fn with_capabilities(
        dir: impl AsRef<Path>,
        fs: Arc<dyn FileIo>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            version: STATE_VERSION,
            fs,
            ids,
        }
    }

    fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        if !self.fs.exists(&self.dir).await {
            return Err(StateError::StateDirMissing(format!(
                "{}: no such file or directory",
                self.dir.display()
            )));
        }
        Ok(())
    }

    async fn ensure_dir(&self, dir: PathBuf) -> Result<PathBuf> {
        self.fs.create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Load the environment state
    ///
    /// A missing file, or one that decodes to nothing, yields a fresh state
    /// stamped with the current version.
    pub async fn get_state(&self) -> Result<State> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        if !self.fs.exists(&path).await {
            tracing::debug!("State file not found, returning empty state");
            return Ok(self.fresh_state());
        }

        let content = self.fs.read_to_string(&path).await?;
        if content.trim().is_empty() {
            return Ok(self.fresh_state());
        }

        let mut state: State = serde_json::from_str(&content)?;
        if state.is_empty() {
            state = self.fresh_state();
        }

        if state.version < OLDEST_SUPPORTED_VERSION {
            return Err(StateError::IncompatibleVersion(state.version));
        }

        if state.version > self.version {
            return Err(StateError::NewerVersion(state.version));
        }

        state.strip_secrets();
        tracing::debug!("Loaded state version {} from {}", state.version, path.display());
        Ok(state)
    }

    /// Id of the environment already on disk, if any
    async fn saved_id(&self, path: &Path) -> Option<String> {
        let content = self.fs.read_to_string(path).await.ok()?;
        let saved: serde_json::Value = serde_json::from_str(&content).ok()?;
        saved
            .get("id")
            .and_then(serde_json::Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    fn fresh_state(&self) -> State {
        State {
            version: self.version,
            ..Default::default()
        }
    }
}

#[async_trait]
impl StateStore for Store {
    fn state_dir(&self) -> &Path {
        &self.dir
    }

    /// Persist the state
    ///
    /// Saving the empty state removes the file. Otherwise the id is assigned
    /// if missing, the version stamped and secrets stripped before writing.
    async fn set(&self, state: &State) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        if state.is_empty() {
            if self.fs.exists(&path).await {
                match self.fs.remove_file(&path).await {
                    Ok(()) => tracing::debug!("Removed state file {}", path.display()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
            return Ok(());
        }

        let mut state = state.clone();
        state.version = self.version;
        if state.id.is_empty() {
            state.id = match self.saved_id(&path).await {
                Some(id) => id,
                None => self.ids.generate(),
            };
        }
        state.strip_secrets();

        let content = to_tab_indented_json(&state)?;
        self.fs.write(&path, &content, STATE_FILE_MODE).await?;

        tracing::debug!("Saved state to {}", path.display());
        Ok(())
    }

    async fn bbl_dir(&self) -> Result<PathBuf> {
        self.ensure_dir(self.dir.join(BBL_DIR)).await
    }

    async fn cloud_config_dir(&self) -> Result<PathBuf> {
        self.ensure_dir(self.dir.join(BBL_DIR).join(CLOUD_CONFIG_DIR))
            .await
    }

    async fn vars_dir(&self) -> Result<PathBuf> {
        self.ensure_dir(self.dir.join(VARS_DIR)).await
    }

    async fn terraform_dir(&self) -> Result<PathBuf> {
        self.ensure_dir(self.dir.join(TERRAFORM_DIR)).await
    }

    async fn deployment_dir(&self, name: &str) -> Result<PathBuf> {
        self.ensure_dir(self.dir.join(name)).await
    }
}

fn to_tab_indented_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iaas::Iaas;
    use std::io;
    use tempfile::tempdir;

    struct FixedId;

    impl IdGenerator for FixedId {
        fn generate(&self) -> String {
            "some-fixed-id".to_string()
        }
    }

    struct FailingWrites;

    #[async_trait]
    impl FileIo for FailingWrites {
        async fn read_to_string(&self, path: &Path) -> io::Result<String> {
            LocalFs.read_to_string(path).await
        }

        async fn write(&self, _path: &Path, _contents: &[u8], _mode: u32) -> io::Result<()> {
            Err(io::Error::other("failed to write file"))
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

    fn store(dir: &Path) -> Store {
        Store::with_capabilities(dir, Arc::new(LocalFs), Arc::new(FixedId))
    }

    fn populated_state() -> State {
        let mut state = State {
            iaas: Some(Iaas::Aws),
            env_id: "some-env-id".to_string(),
            tf_state: "some-tf-state".to_string(),
            ..Default::default()
        };
        state.aws.access_key_id = "some-access-key-id".to_string();
        state.aws.secret_access_key = "some-secret-access-key".to_string();
        state.aws.region = "some-region".to_string();
        state.gcp.service_account_key = "some-service-account-key".to_string();
        state.gcp.project_id = "some-project-id".to_string();
        state.azure.client_secret = "some-client-secret".to_string();
        state
    }

    async fn write_raw(dir: &Path, content: &str) {
        tokio::fs::write(dir.join(STATE_FILE), content).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let store = store(temp_dir.path());

        store.set(&populated_state()).await.unwrap();

        let loaded = store.get_state().await.unwrap();
        assert_eq!(loaded.version, STATE_VERSION);
        assert_eq!(loaded.id, "some-fixed-id");
        assert_eq!(loaded.iaas, Some(Iaas::Aws));
        assert_eq!(loaded.env_id, "some-env-id");
        assert_eq!(loaded.tf_state, "some-tf-state");
        assert_eq!(loaded.aws.region, "some-region");
    }

    #[tokio::test]
    async fn test_save_strips_secrets() {
        let temp_dir = tempdir().unwrap();
        let store = store(temp_dir.path());

        store.set(&populated_state()).await.unwrap();

        let raw = std::fs::read_to_string(temp_dir.path().join(STATE_FILE)).unwrap();
        assert!(!raw.contains("some-access-key-id"));
        assert!(!raw.contains("some-secret-access-key"));
        assert!(!raw.contains("some-service-account-key"));
        assert!(!raw.contains("some-project-id"));
        assert!(!raw.contains("some-client-secret"));
        assert!(raw.contains("\t\"envID\": \"some-env-id\""));
    }

    #[tokio::test]
    async fn test_save_is_idempotent() {
        let temp_dir = tempdir().unwrap();
        let store = store(temp_dir.path());
        let path = temp_dir.path().join(STATE_FILE);

        store.set(&populated_state()).await.unwrap();
        let first = std::fs::read(&path).unwrap();

        let mut without_secrets = populated_state();
        without_secrets.strip_secrets();
        store.set(&without_secrets).await.unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_save_keeps_existing_id() {
        let temp_dir = tempdir().unwrap();
        let store = store(temp_dir.path());

        let state = State {
            id: "existing-id".to_string(),
            ..populated_state()
        };
        store.set(&state).await.unwrap();

        let loaded = store.get_state().await.unwrap();
        assert_eq!(loaded.id, "existing-id");
    }

    #[tokio::test]
    async fn test_id_is_assigned_once() {
        struct Counter(std::sync::atomic::AtomicUsize);

        impl IdGenerator for Counter {
            fn generate(&self) -> String {
                let n = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                format!("id-{}", n)
            }
        }

        let temp_dir = tempdir().unwrap();
        let store = Store::with_capabilities(
            temp_dir.path(),
            Arc::new(LocalFs),
            Arc::new(Counter(Default::default())),
        );

        let state = populated_state();
        store.set(&state).await.unwrap();
        store.set(&state).await.unwrap();

        let loaded = store.get_state().await.unwrap();
        assert_eq!(loaded.id, "id-0");
    }

    #[tokio::test]
    async fn test_save_sets_file_mode() {
        let temp_dir = tempdir().unwrap();
        store(temp_dir.path()).set(&populated_state()).await.unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(temp_dir.path().join(STATE_FILE))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o644);
        }
    }

    #[tokio::test]
    async fn test_save_empty_state_removes_file() {
        let temp_dir = tempdir().unwrap();
        let store = store(temp_dir.path());
        let path = temp_dir.path().join(STATE_FILE);

        store.set(&populated_state()).await.unwrap();
        assert!(path.exists());

        store.set(&State::default()).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_save_empty_state_without_file_is_noop() {
        let temp_dir = tempdir().unwrap();
        let store = store(temp_dir.path());

        store.set(&State::default()).await.unwrap();
        assert!(!temp_dir.path().join(STATE_FILE).exists());
    }

    #[tokio::test]
    async fn test_save_missing_dir() {
        let temp_dir = tempdir().unwrap();
        let store = store(&temp_dir.path().join("missing"));

        let err = store.set(&populated_state()).await.unwrap_err();
        assert!(err.to_string().starts_with("Stat state dir:"));
    }

    #[tokio::test]
    async fn test_save_write_failure() {
        let temp_dir = tempdir().unwrap();
        let store =
            Store::with_capabilities(temp_dir.path(), Arc::new(FailingWrites), Arc::new(FixedId));

        let err = store.set(&populated_state()).await.unwrap_err();
        assert!(err.to_string().contains("failed to write file"));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = tempdir().unwrap();
        let state = store(temp_dir.path()).get_state().await.unwrap();
        assert_eq!(
            state,
            State {
                version: STATE_VERSION,
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn test_load_missing_dir() {
        let temp_dir = tempdir().unwrap();
        let result = store(&temp_dir.path().join("missing")).get_state().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_empty_document() {
        let temp_dir = tempdir().unwrap();
        write_raw(temp_dir.path(), "{}").await;

        let state = store(temp_dir.path()).get_state().await.unwrap();
        assert_eq!(state.version, STATE_VERSION);
        assert!(state.env_id.is_empty());
    }

    #[tokio::test]
    async fn test_load_zero_value_document() {
        let temp_dir = tempdir().unwrap();
        write_raw(
            temp_dir.path(),
            r#"{"version": 0, "iaas": "", "id": "", "envID": "", "tfState": ""}"#,
        )
        .await;

        let state = store(temp_dir.path()).get_state().await.unwrap();
        assert_eq!(state.version, STATE_VERSION);
    }

    #[tokio::test]
    async fn test_load_incompatible_version() {
        let temp_dir = tempdir().unwrap();
        write_raw(temp_dir.path(), r#"{"version": 2, "envID": "old"}"#).await;

        let err = store(temp_dir.path()).get_state().await.unwrap_err();
        assert!(matches!(err, StateError::IncompatibleVersion(2)));
        assert!(err.to_string().contains("incompatible with bbl v3"));
    }

    #[tokio::test]
    async fn test_load_newer_version() {
        let temp_dir = tempdir().unwrap();
        write_raw(temp_dir.path(), r#"{"version": 13, "envID": "new"}"#).await;

        let err = store(temp_dir.path()).get_state().await.unwrap_err();
        assert!(matches!(err, StateError::NewerVersion(13)));
        assert!(err.to_string().contains("Please upgrade"));
    }

    #[tokio::test]
    async fn test_load_never_reads_secrets() {
        let temp_dir = tempdir().unwrap();
        write_raw(
            temp_dir.path(),
            r#"{"version": 12, "envID": "env", "aws": {"accessKeyId": "leaked", "region": "r"}}"#,
        )
        .await;

        let state = store(temp_dir.path()).get_state().await.unwrap();
        assert!(state.aws.access_key_id.is_empty());
        assert_eq!(state.aws.region, "r");
    }

    #[tokio::test]
    async fn test_load_invalid_json() {
        let temp_dir = tempdir().unwrap();
        write_raw(temp_dir.path(), "{not json").await;

        let err = store(temp_dir.path()).get_state().await.unwrap_err();
        assert!(matches!(err, StateError::Json(_)));
    }

    #[tokio::test]
    async fn test_directories_are_created() {
        let temp_dir = tempdir().unwrap();
        let store = store(temp_dir.path());

        let cloud_config = store.cloud_config_dir().await.unwrap();
        assert_eq!(cloud_config, temp_dir.path().join(".bbl").join("cloudconfig"));
        assert!(cloud_config.is_dir());

        assert!(store.bbl_dir().await.unwrap().is_dir());
        assert_eq!(store.vars_dir().await.unwrap(), temp_dir.path().join("vars"));
        assert!(store.terraform_dir().await.unwrap().is_dir());
        assert!(
            store
                .deployment_dir("jumpbox-deployment")
                .await
                .unwrap()
                .is_dir()
        );
    }
}

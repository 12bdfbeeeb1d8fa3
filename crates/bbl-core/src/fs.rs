//! Filesystem capability
//!
//! Components that write files receive a `FileIo` instead of calling
//! `tokio::fs` directly, so tests can substitute failing or recording
//! implementations without touching global state.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use tokio::fs;

#[async_trait]
pub trait FileIo: Send + Sync {
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Overwrite `path` with `contents` and set its permission bits
    async fn write(&self, path: &Path, contents: &[u8], mode: u32) -> io::Result<()>;

    async fn exists(&self, path: &Path) -> bool;

    async fn remove_file(&self, path: &Path) -> io::Result<()>;

    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// The real local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl FileIo for LocalFs {
    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8], mode: u32) -> io::Result<()> {
        fs::write(path, contents).await?;
        set_mode(path, mode).await
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).await
    }
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_sets_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("script.sh");

        LocalFs.write(&path, b"#!/bin/sh\n", 0o755).await.unwrap();

        assert_eq!(LocalFs.read_to_string(&path).await.unwrap(), "#!/bin/sh\n");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[tokio::test]
    async fn test_exists_and_remove() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file");
        assert!(!LocalFs.exists(&path).await);

        LocalFs.write(&path, b"x", 0o644).await.unwrap();
        assert!(LocalFs.exists(&path).await);

        LocalFs.remove_file(&path).await.unwrap();
        assert!(!LocalFs.exists(&path).await);
    }
}

//! Seeding deployment directories from local checkouts

use crate::error::{BoshError, Result};
use std::path::Path;
use tokio::fs;

/// Recursively copy `src` into `dst`, leaving files that already exist alone
pub async fn copy_without_clobber(src: &Path, dst: &Path) -> Result<usize> {
    if !fs::try_exists(src).await.unwrap_or(false) {
        return Err(BoshError::SourceNotFound(src.display().to_string()));
    }

    let mut copied = 0;
    let mut pending = vec![(src.to_path_buf(), dst.to_path_buf())];

    while let Some((from, to)) = pending.pop() {
        fs::create_dir_all(&to).await?;

        let mut entries = fs::read_dir(&from).await?;
        while let Some(entry) = entries.next_entry().await? {
            let target = to.join(entry.file_name());
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                if entry.file_name() == ".git" {
                    continue;
                }
                pending.push((entry.path(), target));
            } else if fs::try_exists(&target).await.unwrap_or(false) {
                tracing::debug!("Keeping existing {}", target.display());
            } else {
                fs::copy(entry.path(), &target).await?;
                copied += 1;
            }
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copy_without_clobber() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();

        std::fs::create_dir_all(src.path().join("aws")).unwrap();
        std::fs::create_dir_all(src.path().join(".git")).unwrap();
        std::fs::write(src.path().join("bosh.yml"), "upstream").unwrap();
        std::fs::write(src.path().join("aws").join("cpi.yml"), "cpi").unwrap();
        std::fs::write(src.path().join(".git").join("HEAD"), "ref").unwrap();
        std::fs::write(dst.path().join("bosh.yml"), "edited").unwrap();

        let copied = copy_without_clobber(src.path(), dst.path()).await.unwrap();

        assert_eq!(copied, 1);
        assert_eq!(
            std::fs::read_to_string(dst.path().join("bosh.yml")).unwrap(),
            "edited"
        );
        assert_eq!(
            std::fs::read_to_string(dst.path().join("aws").join("cpi.yml")).unwrap(),
            "cpi"
        );
        assert!(!dst.path().join(".git").exists());
    }

    #[tokio::test]
    async fn test_missing_source() {
        let dst = TempDir::new().unwrap();
        let err = copy_without_clobber(&dst.path().join("nope"), dst.path())
            .await
            .unwrap_err();
        assert!(matches!(err, BoshError::SourceNotFound(_)));
    }
}

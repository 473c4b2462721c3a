use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::domain::users::profile::upload::UploadStore;
use crate::error::{CoreError, Result};

/// URL/path prefix under which stored uploads are addressed.
pub const UPLOADS_PREFIX: &str = "uploads";

/// Stores uploads as flat files in one directory. Stored paths have the form
/// `uploads/<uuid-v4>.<ext>`, independent of the client's filename.
#[derive(Debug, Clone)]
pub struct DiskUploadStore {
    root: PathBuf,
}

impl DiskUploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a stored relative path back to a file inside `root`, refusing
    /// anything that is not a plain file name under the uploads prefix.
    fn resolve(&self, relative_path: &str) -> Result<PathBuf> {
        let file_name = relative_path
            .strip_prefix(UPLOADS_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| {
                !name.is_empty()
                    && !name.contains(['/', '\\'])
                    && *name != "."
                    && *name != ".."
            })
            .ok_or_else(|| CoreError::InvalidPath(relative_path.to_string()))?;

        Ok(self.root.join(file_name))
    }
}

#[async_trait]
impl UploadStore for DiskUploadStore {
    async fn store(&self, extension: &str, bytes: &[u8]) -> Result<String> {
        fs::create_dir_all(&self.root).await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        fs::write(self.root.join(&file_name), bytes).await?;

        Ok(format!("{UPLOADS_PREFIX}/{file_name}"))
    }

    async fn remove(&self, relative_path: &str) -> Result<()> {
        let path = self.resolve(relative_path)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_under_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskUploadStore::new(dir.path());

        let first = store.store("png", b"one").await.unwrap();
        let second = store.store("png", b"two").await.unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("uploads/"));
        assert!(first.ends_with(".png"));

        let on_disk = store.resolve(&first).unwrap();
        assert_eq!(std::fs::read(on_disk).unwrap(), b"one");
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskUploadStore::new(dir.path());

        let path = store.store("jpg", b"data").await.unwrap();
        store.remove(&path).await.unwrap();
        store.remove(&path).await.unwrap();
        assert!(!store.resolve(&path).unwrap().exists());
    }

    #[test]
    fn refuses_paths_outside_the_root() {
        let store = DiskUploadStore::new("/srv/uploads");
        for bad in ["uploads/../etc/passwd", "uploads/", "other/a.png", "uploads/.."] {
            assert!(
                matches!(store.resolve(bad), Err(CoreError::InvalidPath(_))),
                "{bad} should be refused"
            );
        }
    }
}

/// Directory-backed attachment store
///
/// Stores each attachment as one file under a root directory. References
/// are generated filenames of the form `file-{millis}-{random}{ext}`, so
/// they stay unique without any coordination and reveal nothing about the
/// uploader. References are validated before use: anything containing a
/// path separator or a `..` segment is rejected outright.

use super::{AttachmentStore, StorageError};
use async_trait::async_trait;
use rand::Rng;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Attachment store writing to a local directory
#[derive(Debug, Clone)]
pub struct DiskAttachmentStore {
    root: PathBuf,
}

impl DiskAttachmentStore {
    /// Creates a store rooted at `root`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generates a unique reference, keeping the original extension
    fn generate_reference(original_name: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        format!("file-{}-{}{}", millis, suffix, ext)
    }

    /// Resolves a reference to a path under the root, rejecting traversal
    fn resolve(&self, reference: &str) -> Result<PathBuf, StorageError> {
        if reference.is_empty()
            || reference.contains('/')
            || reference.contains('\\')
            || reference.contains("..")
        {
            return Err(StorageError::InvalidReference(reference.to_string()));
        }

        Ok(self.root.join(reference))
    }
}

#[async_trait]
impl AttachmentStore for DiskAttachmentStore {
    async fn write(&self, content: &[u8], original_name: &str) -> Result<String, StorageError> {
        let reference = Self::generate_reference(original_name);
        let path = self.root.join(&reference);

        fs::write(&path, content).await?;
        debug!(reference = %reference, bytes = content.len(), "Stored attachment");

        Ok(reference)
    }

    async fn delete(&self, reference: &str) -> Result<bool, StorageError> {
        let path = self.resolve(reference)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(reference = %reference, "Deleted attachment");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn exists(&self, reference: &str) -> Result<bool, StorageError> {
        let path = self.resolve(reference)?;
        Ok(fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (TempDir, DiskAttachmentStore) {
        let dir = TempDir::new().expect("temp dir");
        let store = DiskAttachmentStore::new(dir.path())
            .await
            .expect("create store");
        (dir, store)
    }

    #[tokio::test]
    async fn test_write_returns_reference_with_extension() {
        let (_dir, store) = store().await;

        let reference = store.write(b"content", "report.pdf").await.unwrap();
        assert!(reference.starts_with("file-"));
        assert!(reference.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_write_without_extension() {
        let (_dir, store) = store().await;

        let reference = store.write(b"content", "README").await.unwrap();
        assert!(reference.starts_with("file-"));
        assert!(!reference.contains('.'));
    }

    #[tokio::test]
    async fn test_write_then_exists_then_delete() {
        let (_dir, store) = store().await;

        let reference = store.write(b"bytes", "a.txt").await.unwrap();
        assert!(store.exists(&reference).await.unwrap());

        assert!(store.delete(&reference).await.unwrap());
        assert!(!store.exists(&reference).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_reference_reports_false() {
        let (_dir, store) = store().await;

        let removed = store.delete("file-0-0.txt").await.unwrap();
        assert!(!removed);
    }

    #[tokio::test]
    async fn test_references_are_unique() {
        let (_dir, store) = store().await;

        let r1 = store.write(b"one", "a.txt").await.unwrap();
        let r2 = store.write(b"two", "a.txt").await.unwrap();
        assert_ne!(r1, r2);
    }

    #[tokio::test]
    async fn test_traversal_reference_rejected() {
        let (_dir, store) = store().await;

        let result = store.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidReference(_))));

        let result = store.exists("a/b.txt").await;
        assert!(matches!(result, Err(StorageError::InvalidReference(_))));
    }

    #[tokio::test]
    async fn test_new_creates_missing_directory() {
        let dir = TempDir::new().expect("temp dir");
        let nested = dir.path().join("uploads");

        let store = DiskAttachmentStore::new(&nested).await.expect("create");
        assert!(nested.is_dir());
        assert_eq!(store.root(), nested.as_path());
    }
}

/// Attachment storage for uploaded files
///
/// The store persists uploaded binary content and hands back an opaque
/// string reference; todos carry the reference, never a filesystem path.
/// Deleting by reference is idempotent (deleting missing content reports
/// `false` rather than failing), which is what the best-effort cleanup
/// paths in the API rely on.
///
/// # Modules
///
/// - [`disk`]: directory-backed implementation used in production
///
/// # Example
///
/// ```no_run
/// use todovault_shared::storage::{AttachmentStore, disk::DiskAttachmentStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = DiskAttachmentStore::new("./uploads").await?;
///
/// let reference = store.write(b"file bytes", "report.pdf").await?;
/// assert!(store.delete(&reference).await?);
/// assert!(!store.delete(&reference).await?); // already gone
/// # Ok(())
/// # }
/// ```

pub mod disk;

use async_trait::async_trait;

/// Error type for attachment store operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reference contains path separators or traversal segments
    #[error("Invalid attachment reference: {0}")]
    InvalidReference(String),

    /// Underlying I/O failure
    #[error("Attachment I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable store for uploaded attachment content
///
/// Implementations return stable, opaque references. A reference written by
/// `write` stays valid until `delete` is called with it; no reference is
/// ever shared between two todos.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Persists content and returns its reference
    ///
    /// `original_name` is only consulted for its extension; the reference
    /// itself is generated server-side.
    async fn write(&self, content: &[u8], original_name: &str) -> Result<String, StorageError>;

    /// Deletes content by reference
    ///
    /// Returns `true` if content was removed, `false` if it was already
    /// missing. Both are success for callers doing cleanup.
    async fn delete(&self, reference: &str) -> Result<bool, StorageError>;

    /// Checks whether content exists for a reference
    async fn exists(&self, reference: &str) -> Result<bool, StorageError>;
}

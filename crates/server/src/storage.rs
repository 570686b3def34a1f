//! # Content Store
//!
//! Filesystem-backed content store for uploaded documents. Callers hold
//! opaque handles; the store owns naming and placement. A write that fails
//! removes whatever it managed to put on disk before returning, so no
//! partial file ever survives a failed operation.

use std::path::{Path, PathBuf};

use error::{AppError, Result, ResultExt};
use tracing::debug;

/// Filesystem content store rooted at a single directory.
#[derive(Clone, Debug)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// The root directory of the store.
    pub fn root(&self) -> &Path { &self.root }

    /// Store a blob and return its handle.
    ///
    /// The handle embeds a random prefix so distinct uploads with the same
    /// suggested name never collide.
    pub async fn store(&self, bytes: &[u8], suggested_name: &str) -> Result<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .context("Creating content store root")?;

        let handle = format!(
            "{}_{}",
            uuid::Uuid::new_v4().simple(),
            sanitize_filename(suggested_name)
        );
        let path = self.root.join(&handle);

        if let Err(e) = tokio::fs::write(&path, bytes).await {
            // Discard whatever was partially written
            let _ = tokio::fs::remove_file(&path).await;
            return Err(AppError::from(e).context("Writing blob to content store"));
        }

        debug!(handle = %handle, size = bytes.len(), "Stored blob");
        Ok(handle)
    }

    /// Fetch a blob by handle.
    pub async fn fetch(&self, handle: &str) -> Result<Vec<u8>> {
        let path = self.resolve(handle)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::not_found("Stored file not found"))
            },
            Err(e) => Err(AppError::from(e).context("Reading blob from content store")),
        }
    }

    /// Remove a blob by handle. Missing files are not an error; removal is
    /// used for cleanup after failed transactions and cascade deletes.
    pub async fn remove(&self, handle: &str) -> Result<()> {
        let path = self.resolve(handle)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::from(e).context("Removing blob from content store")),
        }
    }

    /// Resolve a handle to a path inside the root, rejecting traversal.
    fn resolve(&self, handle: &str) -> Result<PathBuf> {
        if handle.is_empty() || handle.contains('/') || handle.contains('\\') || handle.contains("..") {
            return Err(AppError::validation("Invalid file handle"));
        }
        Ok(self.root.join(handle))
    }
}

/// Reduce a client-supplied filename to a safe single path component.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            }
            else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    }
    else {
        cleaned
    }
}

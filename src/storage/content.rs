//! Content storage for raw page bodies
//!
//! Bodies are addressed by an opaque reference string. The filesystem store
//! names files after the SHA-256 of the body, so identical pages share a file.

use crate::storage::{StorageError, StorageResult};
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};

/// Pluggable store for page bodies
pub trait ContentStore: Send + Sync {
    /// Stores a body and returns its reference
    fn store(&self, url: &str, body: &[u8]) -> StorageResult<String>;

    /// Loads a body by reference
    fn load(&self, reference: &str) -> StorageResult<Vec<u8>>;
}

/// Stores bodies under `<root>/html/<sha256>.html`
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    /// Creates the store, making sure the directory exists
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join("html"))?;
        Ok(Self { root })
    }

    fn resolve(&self, reference: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(reference);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::ContentNotFound(reference.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl ContentStore for FsContentStore {
    fn store(&self, url: &str, body: &[u8]) -> StorageResult<String> {
        let reference = format!("html/{}.html", hex::encode(Sha256::digest(body)));
        let path = self.resolve(&reference)?;

        if !path.exists() {
            std::fs::write(&path, body)?;
        }
        tracing::debug!("Stored {} bytes for {} as {}", body.len(), url, reference);
        Ok(reference)
    }

    fn load(&self, reference: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(reference)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::ContentNotFound(reference.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

//! Local filesystem storage, scoped by role.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use webpify_core::models::StorageRole;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Persist failed: {0}")]
    PersistFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage filename: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Role-scoped local disk store.
///
/// Owns the storage root and its three role directories. Filenames are the
/// only keys; callers obtain them from [`crate::keys`].
#[derive(Clone, Debug)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Create a store rooted at `root`, creating every role directory.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        for role in StorageRole::all() {
            let dir = root.join(role.dir_name());
            fs::create_dir_all(&dir).await.map_err(|e| {
                StorageError::Config(format!(
                    "Failed to create storage directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        Ok(DiskStore { root })
    }

    /// Directory holding one storage role.
    pub fn role_dir(&self, role: StorageRole) -> PathBuf {
        self.root.join(role.dir_name())
    }

    /// Resolve a filename inside a role directory, rejecting anything that
    /// could escape it.
    pub fn entry_path(&self, role: StorageRole, filename: &str) -> StorageResult<PathBuf> {
        if filename.is_empty()
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
        {
            return Err(StorageError::InvalidName(filename.to_string()));
        }
        Ok(self.role_dir(role).join(filename))
    }

    /// Write `data` under the given role and sync it to disk. The file is
    /// fully persisted when this returns; readers never observe a partial
    /// write through this path.
    pub async fn persist(
        &self,
        role: StorageRole,
        filename: &str,
        data: &[u8],
    ) -> StorageResult<PathBuf> {
        let path = self.entry_path(role, filename)?;
        persist_file(&path, data).await?;

        tracing::debug!(
            path = %path.display(),
            size_bytes = data.len(),
            "Persisted file"
        );
        Ok(path)
    }

    /// Open a role entry for reading, returning the handle and its length.
    pub async fn open(
        &self,
        role: StorageRole,
        filename: &str,
    ) -> StorageResult<(fs::File, u64)> {
        let path = self.entry_path(role, filename)?;
        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StorageError::NotFound(filename.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        let len = file.metadata().await?.len();
        Ok((file, len))
    }

    /// Delete a role entry. Deleting an already-absent entry is a success.
    pub async fn delete(&self, role: StorageRole, filename: &str) -> StorageResult<()> {
        let path = self.entry_path(role, filename)?;
        remove_entry(&path).await
    }
}

/// Write and fsync a file at an explicit path (used for batch working
/// directories whose paths are composed by the orchestrator).
pub async fn persist_file(path: &Path, data: &[u8]) -> StorageResult<()> {
    let mut file = fs::File::create(path).await.map_err(|e| {
        StorageError::PersistFailed(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    file.write_all(data).await.map_err(|e| {
        StorageError::PersistFailed(format!("Failed to write file {}: {}", path.display(), e))
    })?;
    file.sync_all().await.map_err(|e| {
        StorageError::PersistFailed(format!("Failed to sync file {}: {}", path.display(), e))
    })?;
    Ok(())
}

/// Remove a file or directory tree. Idempotent: an absent path is a success,
/// so racing deleters (sweep vs. delayed removal) never error.
pub async fn remove_entry(path: &Path) -> StorageResult<()> {
    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(StorageError::Io(e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };

    match result {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed storage entry");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::Io(e)),
    }
}

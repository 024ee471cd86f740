//! Storage lifecycle management: periodic sweeps, forced sweeps, and one-shot
//! delayed deletion.
//!
//! Every artifact moves through `Created -> Active -> Expired/Deleted`. Two
//! independent mechanisms reclaim space: a periodic sweep comparing each
//! entry's mtime against its role's TTL, and fire-and-forget delayed removal
//! of a specific path (used after downloads and for batch working
//! directories). Sweep failures are logged and swallowed; they never affect
//! request handling.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::interval;
use utoipa::ToSchema;
use webpify_core::models::{RetentionPolicy, StorageRole};

use crate::local::{remove_entry, DiskStore, StorageResult};

/// Retention and cadence settings for the sweeper.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleConfig {
    pub sweep_interval: Duration,
    pub staging_ttl: Duration,
    pub converted_ttl: Duration,
    pub batch_ttl: Duration,
    /// Short override TTL applied by operator-triggered forced sweeps.
    pub forced_ttl: Duration,
}

/// File count and byte total for one storage role.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct RoleUsage {
    pub files: u64,
    pub bytes: u64,
}

/// Usage snapshot across all roles.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct StorageUsage {
    pub staging: RoleUsage,
    pub converted: RoleUsage,
    pub batch: RoleUsage,
}

impl StorageUsage {
    pub fn role(&self, role: StorageRole) -> RoleUsage {
        match role {
            StorageRole::Staging => self.staging,
            StorageRole::SingleOutput => self.converted,
            StorageRole::BatchOutput => self.batch,
        }
    }

    pub fn total(&self) -> RoleUsage {
        RoleUsage {
            files: self.staging.files + self.converted.files + self.batch.files,
            bytes: self.staging.bytes + self.converted.bytes + self.batch.bytes,
        }
    }
}

/// Owns reclamation of all ephemeral storage.
///
/// Configuration is injected and the sweep loop has an explicit start, so
/// tests drive sweeps directly instead of waiting on wall-clock timers.
pub struct StorageLifecycle {
    store: Arc<DiskStore>,
    config: LifecycleConfig,
    /// Excludes overlapping sweep cycles: if a cycle is still running when
    /// the next timer fires, the new cycle is skipped.
    cycle: Mutex<()>,
}

impl StorageLifecycle {
    pub fn new(store: Arc<DiskStore>, config: LifecycleConfig) -> Self {
        Self {
            store,
            config,
            cycle: Mutex::new(()),
        }
    }

    /// Retention policy for one role.
    pub fn policy_for(&self, role: StorageRole) -> RetentionPolicy {
        let max_age = match role {
            StorageRole::Staging => self.config.staging_ttl,
            StorageRole::SingleOutput => self.config.converted_ttl,
            StorageRole::BatchOutput => self.config.batch_ttl,
        };
        RetentionPolicy { role, max_age }
    }

    /// Start the background sweep loop. The first pass runs immediately
    /// (startup sweep), then every `sweep_interval`.
    /// Returns a JoinHandle for graceful shutdown.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.config.sweep_interval);

            loop {
                sweep_interval.tick().await;

                match self.cycle.try_lock() {
                    Ok(_guard) => {
                        tracing::info!("Starting scheduled cleanup of expired files");
                        let removed = self.sweep_all().await;
                        tracing::info!(removed, "Cleanup pass completed");
                    }
                    Err(_) => {
                        tracing::warn!("Previous cleanup pass still running, skipping this cycle");
                    }
                }
            }
        })
    }

    /// Sweep every role with its configured TTL. Returns total entries removed.
    pub async fn sweep_all(&self) -> usize {
        let mut removed = 0;
        for role in StorageRole::all() {
            let policy = self.policy_for(role);
            match self.sweep_role(role, policy.max_age).await {
                Ok(count) => removed += count,
                Err(e) => {
                    tracing::error!(error = %e, role = ?role, "Failed to sweep storage role");
                }
            }
        }
        removed
    }

    /// On-demand sweep of every role using the short override TTL.
    pub async fn force_sweep(&self) -> usize {
        let mut removed = 0;
        for role in StorageRole::all() {
            match self.sweep_role(role, self.config.forced_ttl).await {
                Ok(count) => removed += count,
                Err(e) => {
                    tracing::error!(error = %e, role = ?role, "Failed to force-sweep storage role");
                }
            }
        }
        removed
    }

    /// Delete every entry in one role directory older than `max_age`,
    /// judged by last-modified time. A failure on one entry is logged and
    /// does not block the rest of the pass.
    pub async fn sweep_role(&self, role: StorageRole, max_age: Duration) -> StorageResult<usize> {
        let dir = self.store.role_dir(role);
        let mut entries = tokio::fs::read_dir(&dir).await?;
        let now = SystemTime::now();
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let age = match entry.metadata().await {
                Ok(metadata) => metadata
                    .modified()
                    .ok()
                    .and_then(|mtime| now.duration_since(mtime).ok())
                    .unwrap_or(Duration::ZERO),
                Err(e) => {
                    tracing::error!(error = %e, path = %path.display(), "Failed to stat entry during sweep");
                    continue;
                }
            };

            if age > max_age {
                match remove_entry(&path).await {
                    Ok(()) => {
                        removed += 1;
                        tracing::info!(
                            path = %path.display(),
                            age_secs = age.as_secs(),
                            "Swept expired file"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, path = %path.display(), "Failed to sweep entry");
                    }
                }
            }
        }

        Ok(removed)
    }

    /// Schedule removal of one specific path after `delay`. Fire-and-forget:
    /// not cancellable once scheduled; failures are logged and swallowed.
    pub fn schedule_removal(&self, path: PathBuf, delay: Duration) {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match remove_entry(&path).await {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "Delayed removal completed");
                }
                Err(e) => {
                    tracing::error!(error = %e, path = %path.display(), "Delayed removal failed");
                }
            }
        });
    }

    /// Per-role file counts and byte totals. Counts are top-level entries
    /// (a batch working directory counts as one entry); byte totals include
    /// nested directory contents.
    pub async fn usage(&self) -> StorageResult<StorageUsage> {
        Ok(StorageUsage {
            staging: role_usage(&self.store.role_dir(StorageRole::Staging)).await?,
            converted: role_usage(&self.store.role_dir(StorageRole::SingleOutput)).await?,
            batch: role_usage(&self.store.role_dir(StorageRole::BatchOutput)).await?,
        })
    }
}

async fn role_usage(dir: &Path) -> StorageResult<RoleUsage> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut usage = RoleUsage::default();

    while let Some(entry) = entries.next_entry().await? {
        usage.files += 1;
        usage.bytes += entry_size(entry.path()).await;
    }

    Ok(usage)
}

/// Total size of a file, or of a directory's contents (iterative walk; role
/// directories are at most two levels deep in practice).
async fn entry_size(path: PathBuf) -> u64 {
    let mut total = 0;
    let mut pending = vec![path];

    while let Some(current) = pending.pop() {
        let metadata = match tokio::fs::metadata(&current).await {
            Ok(metadata) => metadata,
            Err(_) => continue,
        };
        if metadata.is_file() {
            total += metadata.len();
        } else if metadata.is_dir() {
            if let Ok(mut children) = tokio::fs::read_dir(&current).await {
                while let Ok(Some(child)) = children.next_entry().await {
                    pending.push(child.path());
                }
            }
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_lifecycle_config() -> LifecycleConfig {
        LifecycleConfig {
            sweep_interval: Duration::from_secs(900),
            staging_ttl: Duration::from_secs(1800),
            converted_ttl: Duration::from_secs(3600),
            batch_ttl: Duration::from_secs(3600),
            forced_ttl: Duration::from_secs(300),
        }
    }

    async fn test_lifecycle(root: &Path) -> StorageLifecycle {
        let store = Arc::new(DiskStore::new(root).await.unwrap());
        StorageLifecycle::new(store, test_lifecycle_config())
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_and_keeps_fresh() {
        let dir = tempdir().unwrap();
        let lifecycle = test_lifecycle(dir.path()).await;
        let staging = dir.path().join("uploads");

        tokio::fs::write(staging.join("old.png"), b"old").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Everything is older than a zero TTL...
        let removed = lifecycle
            .sweep_role(StorageRole::Staging, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(!staging.join("old.png").exists());

        // ...and nothing is older than an hour
        tokio::fs::write(staging.join("fresh.png"), b"fresh").await.unwrap();
        let removed = lifecycle
            .sweep_role(StorageRole::Staging, Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert!(staging.join("fresh.png").exists());
    }

    #[tokio::test]
    async fn test_sweep_removes_batch_directories() {
        let dir = tempdir().unwrap();
        let lifecycle = test_lifecycle(dir.path()).await;
        let batch = dir.path().join("batch").join("batch-1-1");

        tokio::fs::create_dir_all(&batch).await.unwrap();
        tokio::fs::write(batch.join("a.webp"), b"a").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let removed = lifecycle
            .sweep_role(StorageRole::BatchOutput, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(!batch.exists());
    }

    #[tokio::test]
    async fn test_force_sweep_covers_all_roles() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DiskStore::new(dir.path()).await.unwrap());
        let mut config = test_lifecycle_config();
        config.forced_ttl = Duration::ZERO;
        let lifecycle = StorageLifecycle::new(store, config);

        tokio::fs::write(dir.path().join("uploads/a.png"), b"a").await.unwrap();
        tokio::fs::write(dir.path().join("converted/b.webp"), b"b").await.unwrap();
        tokio::fs::write(dir.path().join("batch/c.zip"), b"c").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let removed = lifecycle.force_sweep().await;
        assert_eq!(removed, 3);
    }

    #[tokio::test]
    async fn test_schedule_removal_deletes_after_delay() {
        let dir = tempdir().unwrap();
        let lifecycle = test_lifecycle(dir.path()).await;
        let path = dir.path().join("converted").join("done.webp");
        tokio::fs::write(&path, b"x").await.unwrap();

        lifecycle.schedule_removal(path.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_overlapping_removal_and_sweep_do_not_error() {
        let dir = tempdir().unwrap();
        let lifecycle = test_lifecycle(dir.path()).await;
        let path = dir.path().join("converted").join("raced.webp");
        tokio::fs::write(&path, b"x").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Sweep wins the race, then the delayed removal fires on an absent
        // path; both succeed.
        lifecycle.schedule_removal(path.clone(), Duration::from_millis(10));
        lifecycle
            .sweep_role(StorageRole::SingleOutput, Duration::ZERO)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_usage_counts_and_bytes() {
        let dir = tempdir().unwrap();
        let lifecycle = test_lifecycle(dir.path()).await;

        tokio::fs::write(dir.path().join("uploads/a.png"), vec![0u8; 100])
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("uploads/b.png"), vec![0u8; 50])
            .await
            .unwrap();
        let nested = dir.path().join("batch/batch-1");
        tokio::fs::create_dir_all(&nested).await.unwrap();
        tokio::fs::write(nested.join("c.webp"), vec![0u8; 25]).await.unwrap();

        let usage = lifecycle.usage().await.unwrap();
        assert_eq!(usage.staging.files, 2);
        assert_eq!(usage.staging.bytes, 150);
        assert_eq!(usage.batch.files, 1);
        assert_eq!(usage.batch.bytes, 25);
        assert_eq!(usage.converted.files, 0);
        assert_eq!(usage.total().files, 3);
        assert_eq!(usage.total().bytes, 175);
    }
}

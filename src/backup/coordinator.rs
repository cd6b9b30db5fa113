//! The snapshot run: capture, discover, upload, publish, always clean up

use super::admin::NodeAdmin;
use super::discovery::{discover_keyspace_snapshots, snapshot_files};
use super::store::{ArtifactStore, ManifestStore};
use crate::error::{HaloError, Result};
use halo_core_manifest::{ArtifactKind, SnapshotManifest, SnapshotTag};
use halo_core_retry::{run_with_retry, RetryError, RetryPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Drives one consistent, cataloged snapshot of the local node per run
///
/// Pipeline order is strict: capture happens before discovery, discovery
/// before upload, upload before manifest publication, and cleanup after all
/// of it, on every exit path. The first upload failure aborts the run before
/// publication; a manifest is never published partially.
pub struct SnapshotCoordinator {
    admin: Arc<dyn NodeAdmin>,
    artifacts: Arc<dyn ArtifactStore>,
    manifests: Arc<dyn ManifestStore>,
    data_root: PathBuf,
    tag_format: String,
    retry: RetryPolicy,
}

impl SnapshotCoordinator {
    pub fn new(
        admin: Arc<dyn NodeAdmin>,
        artifacts: Arc<dyn ArtifactStore>,
        manifests: Arc<dyn ManifestStore>,
        data_root: impl Into<PathBuf>,
        tag_format: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            admin,
            artifacts,
            manifests,
            data_root: data_root.into(),
            tag_format: tag_format.into(),
            retry,
        }
    }

    /// Run one snapshot under a tag derived from the current time
    pub fn execute(&self) -> Result<SnapshotManifest> {
        self.execute_with_tag(SnapshotTag::now(&self.tag_format))
    }

    /// Run one snapshot under an explicit tag
    ///
    /// Tags resolve to the second; two runs started within the same second
    /// would collide on the engine's snapshot name. Preventing overlapping
    /// runs is the driving scheduler's contract.
    pub fn execute_with_tag(&self, tag: SnapshotTag) -> Result<SnapshotManifest> {
        info!(%tag, "starting snapshot run");

        // The guard clears the snapshot when it drops, which covers every
        // exit path below, early failures included.
        let _cleanup = ClearGuard {
            coordinator: self,
            tag: tag.clone(),
        };

        let manifest = self.capture_and_publish(&tag)?;
        info!(
            %tag,
            artifacts = manifest.artifacts.len(),
            bytes = manifest.total_bytes(),
            "snapshot run complete"
        );
        Ok(manifest)
    }

    fn capture_and_publish(&self, tag: &SnapshotTag) -> Result<SnapshotManifest> {
        self.take_snapshot(tag)?;

        let contributions = discover_keyspace_snapshots(&self.data_root, tag)?;
        info!(
            %tag,
            keyspaces = contributions.len(),
            "discovered keyspace contributions"
        );

        let mut collected = Vec::new();
        for contribution in contributions {
            for file in snapshot_files(&contribution.dir)? {
                let artifact = self
                    .artifacts
                    .upload(tag, &contribution.keyspace, &file, ArtifactKind::Snapshot)
                    .map_err(|e| HaloError::Upload {
                        path: file.clone(),
                        message: e.to_string(),
                    })?;
                collected.push(artifact);
            }
        }

        // An empty manifest is still published: "nothing had data" is a
        // valid, durable record of the run.
        let manifest = SnapshotManifest::with_artifacts(tag.clone(), collected);
        self.manifests
            .publish(&manifest)
            .map_err(|e| HaloError::ManifestPublish(e.to_string()))?;

        Ok(manifest)
    }

    fn take_snapshot(&self, tag: &SnapshotTag) -> Result<()> {
        run_with_retry(&self.retry, || self.admin.take_snapshot(tag, None, &[]))
            .map_err(|e| admin_exhausted("take_snapshot", e))
    }

    fn clear_snapshot(&self, tag: &SnapshotTag) -> Result<()> {
        run_with_retry(&self.retry, || self.admin.clear_snapshot(tag))
            .map_err(|e| admin_exhausted("clear_snapshot", e))
    }
}

fn admin_exhausted(op: &'static str, err: RetryError<crate::error::ProviderError>) -> HaloError {
    match err {
        RetryError::Exhausted { attempts, source } => HaloError::AdminExhausted {
            op,
            attempts,
            message: source.to_string(),
        },
    }
}

/// Clears the run's snapshot on drop
///
/// Cleanup failures are logged, never propagated: they must not override the
/// run's primary outcome.
struct ClearGuard<'a> {
    coordinator: &'a SnapshotCoordinator,
    tag: SnapshotTag,
}

impl Drop for ClearGuard<'_> {
    fn drop(&mut self) {
        match self.coordinator.clear_snapshot(&self.tag) {
            Ok(()) => info!(tag = %self.tag, "cleared snapshot"),
            Err(e) => {
                // A stale snapshot directory stays on disk until the next
                // successful clear
                error!(tag = %self.tag, error = %e, "snapshot cleanup failed");
                warn!(tag = %self.tag, "stale snapshot may remain on disk");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::store::{LocalArtifactStore, LocalManifestStore};
    use crate::error::ProviderError;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Admin double that materializes snapshot directories the way the data
    /// engine would, and records every call
    struct FakeAdmin {
        data_root: PathBuf,
        keyspaces: Vec<String>,
        take_failures_before_success: Mutex<u32>,
        takes: Mutex<u32>,
        clears: Mutex<Vec<String>>,
    }

    impl FakeAdmin {
        fn new(data_root: &Path, keyspaces: &[&str]) -> Self {
            Self {
                data_root: data_root.to_path_buf(),
                keyspaces: keyspaces.iter().map(|k| k.to_string()).collect(),
                take_failures_before_success: Mutex::new(0),
                takes: Mutex::new(0),
                clears: Mutex::new(Vec::new()),
            }
        }

        fn failing_first(mut self, failures: u32) -> Self {
            self.take_failures_before_success = Mutex::new(failures);
            self
        }
    }

    impl NodeAdmin for FakeAdmin {
        fn take_snapshot(
            &self,
            tag: &SnapshotTag,
            _keyspace: Option<&str>,
            _tables: &[String],
        ) -> std::result::Result<(), ProviderError> {
            *self.takes.lock().unwrap() += 1;
            let mut failures = self.take_failures_before_success.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(ProviderError::new("management interface unreachable"));
            }
            for ks in &self.keyspaces {
                let dir = self
                    .data_root
                    .join(ks)
                    .join("snapshots")
                    .join(tag.as_str());
                fs::create_dir_all(&dir)?;
                fs::write(dir.join(format!("{ks}-data.db")), b"bytes")?;
            }
            Ok(())
        }

        fn clear_snapshot(&self, tag: &SnapshotTag) -> std::result::Result<(), ProviderError> {
            self.clears.lock().unwrap().push(tag.to_string());
            Ok(())
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(1),
            ..Default::default()
        }
    }

    fn coordinator(
        admin: Arc<FakeAdmin>,
        data_root: &Path,
        backup_root: &Path,
    ) -> SnapshotCoordinator {
        SnapshotCoordinator::new(
            admin,
            Arc::new(LocalArtifactStore::new(backup_root)),
            Arc::new(LocalManifestStore::new(backup_root)),
            data_root,
            "%Y%m%d%H%M%S",
            fast_retry(),
        )
    }

    #[test]
    fn test_successful_run_publishes_and_cleans_up() {
        let data = tempfile::tempdir().unwrap();
        let backup = tempfile::tempdir().unwrap();
        let admin = Arc::new(FakeAdmin::new(data.path(), &["ks1"]));

        let coordinator = coordinator(admin.clone(), data.path(), backup.path());
        let tag = SnapshotTag::parse("20240101000000").unwrap();
        let manifest = coordinator.execute_with_tag(tag.clone()).unwrap();

        assert_eq!(manifest.artifacts.len(), 1);
        assert_eq!(manifest.artifacts[0].keyspace, "ks1");
        assert_eq!(*admin.clears.lock().unwrap(), vec![tag.to_string()]);
    }

    #[test]
    fn test_capture_retries_then_succeeds() {
        let data = tempfile::tempdir().unwrap();
        let backup = tempfile::tempdir().unwrap();
        let admin = Arc::new(FakeAdmin::new(data.path(), &["ks1"]).failing_first(2));

        let coordinator = coordinator(admin.clone(), data.path(), backup.path());
        let manifest = coordinator
            .execute_with_tag(SnapshotTag::parse("20240101000000").unwrap())
            .unwrap();

        // Failing twice with max_attempts 3 records exactly 3 capture calls
        assert_eq!(*admin.takes.lock().unwrap(), 3);
        assert_eq!(manifest.artifacts.len(), 1);
    }

    #[test]
    fn test_capture_exhaustion_still_cleans_up_once() {
        let data = tempfile::tempdir().unwrap();
        let backup = tempfile::tempdir().unwrap();
        let admin = Arc::new(FakeAdmin::new(data.path(), &["ks1"]).failing_first(99));

        let coordinator = coordinator(admin.clone(), data.path(), backup.path());
        let err = coordinator
            .execute_with_tag(SnapshotTag::parse("20240101000000").unwrap())
            .unwrap_err();

        assert!(matches!(
            err,
            HaloError::AdminExhausted {
                op: "take_snapshot",
                attempts: 3,
                ..
            }
        ));
        assert_eq!(admin.clears.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_contribution_publishes_empty_manifest() {
        let data = tempfile::tempdir().unwrap();
        let backup = tempfile::tempdir().unwrap();
        // Admin snapshots no keyspaces; data root holds one keyspace with no
        // snapshots directory
        fs::create_dir_all(data.path().join("ks_empty")).unwrap();
        let admin = Arc::new(FakeAdmin::new(data.path(), &[]));

        let coordinator = coordinator(admin.clone(), data.path(), backup.path());
        let manifest = coordinator
            .execute_with_tag(SnapshotTag::parse("20240101000000").unwrap())
            .unwrap();

        assert!(manifest.is_empty());
        assert_eq!(admin.clears.lock().unwrap().len(), 1);
    }
}

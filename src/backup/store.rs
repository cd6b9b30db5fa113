//! Artifact upload and manifest publication seams
//!
//! The remote-storage client proper (object store, blob service) lives
//! outside this crate; these traits are the seam it plugs into. The local
//! implementations below write under a backup root on the node's own disk,
//! which keeps the sidecar operational on deployments that mount their
//! backup target as a filesystem.

use crate::error::ProviderError;
use halo_core_manifest::{ArtifactKind, ArtifactRef, SnapshotManifest, SnapshotTag};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Upload collaborator for backup artifacts
///
/// Retry/backoff for large-object transfer is the implementation's own
/// concern, not the coordinator's.
pub trait ArtifactStore: Send + Sync {
    /// Upload one local file and return its artifact reference
    fn upload(
        &self,
        tag: &SnapshotTag,
        keyspace: &str,
        file: &Path,
        kind: ArtifactKind,
    ) -> Result<ArtifactRef, ProviderError>;
}

/// Durable store for published manifests
pub trait ManifestStore: Send + Sync {
    /// Publish one run's manifest. Called exactly once per run; the
    /// manifest is immutable afterwards.
    fn publish(&self, manifest: &SnapshotManifest) -> Result<(), ProviderError>;
}

/// Artifact store copying into `<root>/<tag>/<keyspace>/<file>`
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactStore for LocalArtifactStore {
    fn upload(
        &self,
        tag: &SnapshotTag,
        keyspace: &str,
        file: &Path,
        kind: ArtifactKind,
    ) -> Result<ArtifactRef, ProviderError> {
        let file_name = file
            .file_name()
            .ok_or_else(|| ProviderError::new(format!("not a file: {}", file.display())))?;

        let dest_dir = self.root.join(tag.as_str()).join(keyspace);
        fs::create_dir_all(&dest_dir)?;

        let dest = dest_dir.join(file_name);
        let size_bytes = fs::copy(file, &dest)?;
        debug!(src = %file.display(), dest = %dest.display(), size_bytes, "stored artifact");

        let remote_path = format!(
            "{}/{}/{}",
            tag.as_str(),
            keyspace,
            file_name.to_string_lossy()
        );
        Ok(ArtifactRef::new(keyspace, file, kind)
            .with_size(size_bytes)
            .with_remote_path(remote_path))
    }
}

/// Manifest store writing `<root>/meta/<tag>.json`
pub struct LocalManifestStore {
    root: PathBuf,
}

impl LocalManifestStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Where a tag's manifest lands
    pub fn manifest_path(&self, tag: &SnapshotTag) -> PathBuf {
        self.root.join("meta").join(format!("{}.json", tag))
    }
}

impl ManifestStore for LocalManifestStore {
    fn publish(&self, manifest: &SnapshotManifest) -> Result<(), ProviderError> {
        let path = self.manifest_path(&manifest.tag);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        manifest
            .save(&path)
            .map_err(|e| ProviderError::new(e.to_string()))?;
        info!(
            tag = %manifest.tag,
            artifacts = manifest.artifacts.len(),
            path = %path.display(),
            "published snapshot manifest"
        );
        Ok(())
    }
}

//! Snapshot tag, artifact reference, and manifest operations
//!
//! The manifest is the top-level record of one snapshot run: the tag that
//! named the run, when it was created, and every artifact uploaded under it.

use crate::error::{Error, Result};
use crate::SNAPSHOT_MANIFEST_SCHEMA_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Timestamp-derived identifier naming one point-in-time snapshot
///
/// The tag must match exactly what the administrative snapshot call creates
/// on disk, so the rendered form is fixed per deployment via the configured
/// format string. Resolution is one second; preventing two runs inside the
/// same second is the scheduler's contract, not this type's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotTag(String);

impl SnapshotTag {
    /// Derive a tag from the current UTC wall clock
    pub fn now(format: &str) -> Self {
        Self::from_datetime(Utc::now(), format)
    }

    /// Derive a tag from an explicit instant (tests, replays)
    pub fn from_datetime(when: DateTime<Utc>, format: &str) -> Self {
        SnapshotTag(when.format(format).to_string())
    }

    /// Wrap an already-rendered tag, rejecting values that cannot name a
    /// directory
    pub fn parse<S: Into<String>>(raw: S) -> Result<Self> {
        let raw = raw.into();
        if raw.is_empty() || raw.contains(std::path::MAIN_SEPARATOR) || raw.contains('/') {
            return Err(Error::invalid_tag(raw));
        }
        Ok(SnapshotTag(raw))
    }

    /// The rendered tag
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of backup artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// File captured under a snapshot directory
    Snapshot,
    /// Manifest / metadata file
    Meta,
    /// Incremental SSTable outside a snapshot
    Sst,
    /// Commit log segment
    CommitLog,
}

impl ArtifactKind {
    /// Convert to string representation
    pub fn as_str(&self) -> &str {
        match self {
            ArtifactKind::Snapshot => "snapshot",
            ArtifactKind::Meta => "meta",
            ArtifactKind::Sst => "sst",
            ArtifactKind::CommitLog => "commitlog",
        }
    }
}

/// Reference to one uploaded backup artifact
///
/// Created during discovery, consumed by upload, referenced by the manifest.
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Keyspace the artifact belongs to
    pub keyspace: String,

    /// Local path the artifact was read from
    pub path: PathBuf,

    /// Artifact kind
    pub kind: ArtifactKind,

    /// Size in bytes, when known at discovery time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    /// Remote location assigned by the upload collaborator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
}

impl ArtifactRef {
    /// Create a new artifact reference
    pub fn new<S: Into<String>, P: Into<PathBuf>>(keyspace: S, path: P, kind: ArtifactKind) -> Self {
        Self {
            keyspace: keyspace.into(),
            path: path.into(),
            kind,
            size_bytes: None,
            remote_path: None,
        }
    }

    /// Set the size in bytes
    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    /// Set the remote location
    pub fn with_remote_path<S: Into<String>>(mut self, remote_path: S) -> Self {
        self.remote_path = Some(remote_path.into());
        self
    }

    /// File name component of the local path, if any
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Catalog of one snapshot run
///
/// Published exactly once per successful run; immutable after publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    /// Schema version identifier
    pub schema: String,

    /// The tag this run snapshotted under
    pub tag: SnapshotTag,

    /// Manifest creation timestamp (UTC)
    pub created_utc: DateTime<Utc>,

    /// Ordered artifact references collected during the run
    pub artifacts: Vec<ArtifactRef>,
}

impl SnapshotManifest {
    /// Create an empty manifest for a tag
    pub fn new(tag: SnapshotTag) -> Self {
        Self {
            schema: SNAPSHOT_MANIFEST_SCHEMA_VERSION.to_string(),
            tag,
            created_utc: Utc::now(),
            artifacts: Vec::new(),
        }
    }

    /// Create a manifest carrying a full artifact set
    pub fn with_artifacts(tag: SnapshotTag, artifacts: Vec<ArtifactRef>) -> Self {
        Self {
            schema: SNAPSHOT_MANIFEST_SCHEMA_VERSION.to_string(),
            tag,
            created_utc: Utc::now(),
            artifacts,
        }
    }

    /// Append one artifact reference
    pub fn add_artifact(&mut self, artifact: ArtifactRef) {
        self.artifacts.push(artifact);
    }

    /// True when no keyspace contributed any artifact
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Total bytes across artifacts with a known size
    pub fn total_bytes(&self) -> u64 {
        self.artifacts.iter().filter_map(|a| a.size_bytes).sum()
    }

    /// Save the manifest to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a manifest from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::manifest_not_found(path));
        }

        let contents = std::fs::read_to_string(path)?;
        let manifest: SnapshotManifest = serde_json::from_str(&contents)?;

        // Validate schema version
        if manifest.schema != SNAPSHOT_MANIFEST_SCHEMA_VERSION {
            return Err(Error::version_mismatch(
                SNAPSHOT_MANIFEST_SCHEMA_VERSION,
                &manifest.schema,
            ));
        }

        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tag_for(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> SnapshotTag {
        let when = Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap();
        SnapshotTag::from_datetime(when, "%Y%m%d%H%M%S")
    }

    #[test]
    fn test_tag_formatting() {
        let tag = tag_for(2024, 1, 2, 3, 4, 5);
        assert_eq!(tag.as_str(), "20240102030405");
        assert_eq!(tag.to_string(), "20240102030405");
    }

    #[test]
    fn test_tag_alternate_format() {
        let when = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let tag = SnapshotTag::from_datetime(when, "%Y-%m-%dT%H-%M-%S");
        assert_eq!(tag.as_str(), "2024-01-01T00-00-00");
    }

    #[test]
    fn test_tag_parse_rejects_path_separators() {
        assert!(SnapshotTag::parse("ok-tag").is_ok());
        assert!(SnapshotTag::parse("").is_err());
        assert!(SnapshotTag::parse("a/b").is_err());
    }

    #[test]
    fn test_artifact_ref_builder() {
        let artifact = ArtifactRef::new("ks1", "/data/ks1/snapshots/t/a.db", ArtifactKind::Snapshot)
            .with_size(2048)
            .with_remote_path("backups/t/ks1/a.db");

        assert_eq!(artifact.keyspace, "ks1");
        assert_eq!(artifact.kind, ArtifactKind::Snapshot);
        assert_eq!(artifact.size_bytes, Some(2048));
        assert_eq!(artifact.remote_path.as_deref(), Some("backups/t/ks1/a.db"));
        assert_eq!(artifact.file_name(), Some("a.db"));
    }

    #[test]
    fn test_artifact_kind_strings() {
        assert_eq!(ArtifactKind::Snapshot.as_str(), "snapshot");
        assert_eq!(ArtifactKind::Meta.as_str(), "meta");
        assert_eq!(ArtifactKind::Sst.as_str(), "sst");
        assert_eq!(ArtifactKind::CommitLog.as_str(), "commitlog");
    }

    #[test]
    fn test_manifest_creation() {
        let mut manifest = SnapshotManifest::new(tag_for(2024, 1, 1, 0, 0, 0));
        assert_eq!(manifest.schema, SNAPSHOT_MANIFEST_SCHEMA_VERSION);
        assert!(manifest.is_empty());

        manifest.add_artifact(
            ArtifactRef::new("ks1", "a.db", ArtifactKind::Snapshot).with_size(10),
        );
        manifest.add_artifact(
            ArtifactRef::new("ks1", "b.db", ArtifactKind::Snapshot).with_size(32),
        );

        assert!(!manifest.is_empty());
        assert_eq!(manifest.total_bytes(), 42);
    }

    #[test]
    fn test_manifest_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20240101000000.json");

        let manifest = SnapshotManifest::with_artifacts(
            tag_for(2024, 1, 1, 0, 0, 0),
            vec![ArtifactRef::new("ks1", "a.db", ArtifactKind::Snapshot)],
        );
        manifest.save(&path).unwrap();

        let loaded = SnapshotManifest::load(&path).unwrap();
        assert_eq!(loaded.tag, manifest.tag);
        assert_eq!(loaded.artifacts, manifest.artifacts);
    }

    #[test]
    fn test_manifest_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SnapshotManifest::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound { .. }));
    }

    #[test]
    fn test_manifest_load_rejects_wrong_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");

        let mut manifest = SnapshotManifest::new(tag_for(2024, 1, 1, 0, 0, 0));
        manifest.schema = "halo.snapshot.v0".to_string();
        let json = serde_json::to_string_pretty(&manifest).unwrap();
        std::fs::write(&path, json).unwrap();

        let err = SnapshotManifest::load(&path).unwrap_err();
        assert!(matches!(err, Error::VersionMismatch { .. }));
    }
}

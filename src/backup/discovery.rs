//! Discovery of freshly captured snapshot artifacts
//!
//! Layout on disk: `<data_root>/<keyspace>/snapshots/<tag>/<files>`.
//! Keyspaces are snapshotted and retained independently, so each one is
//! checked on its own: a keyspace with no `snapshots` directory, or none
//! matching the current tag, simply contributes nothing - that is normal,
//! not an error, and never aborts the run.

use crate::error::Result;
use halo_core_manifest::SnapshotTag;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// One keyspace's contribution to the current snapshot run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyspaceSnapshot {
    /// Keyspace directory name
    pub keyspace: String,
    /// The matched `<keyspace>/snapshots/<tag>` directory
    pub dir: PathBuf,
}

/// Enumerate keyspaces under the data root and return those with a snapshot
/// directory whose name equals the tag exactly
///
/// Results are sorted by keyspace name so runs are deterministic.
pub fn discover_keyspace_snapshots(
    data_root: &Path,
    tag: &SnapshotTag,
) -> Result<Vec<KeyspaceSnapshot>> {
    let mut found = Vec::new();

    for entry in std::fs::read_dir(data_root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let keyspace_dir = entry.path();

        let snapshots_dir = keyspace_dir.join("snapshots");
        if !snapshots_dir.is_dir() {
            debug!(keyspace = %keyspace_dir.display(), "no snapshots directory, skipping");
            continue;
        }

        // Exact name equality, not pattern matching: the tag is the
        // directory name the admin call created
        let snapshot_dir = snapshots_dir.join(tag.as_str());
        if !snapshot_dir.is_dir() {
            debug!(
                keyspace = %keyspace_dir.display(),
                tag = %tag,
                "keyspace did not contribute to this tag, skipping"
            );
            continue;
        }

        let keyspace = entry.file_name().to_string_lossy().into_owned();
        found.push(KeyspaceSnapshot {
            keyspace,
            dir: snapshot_dir,
        });
    }

    found.sort_by(|a, b| a.keyspace.cmp(&b.keyspace));
    Ok(found)
}

/// Enumerate the files under one matched snapshot directory, sorted by name
pub fn snapshot_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            e.into_io_error()
                .unwrap_or_else(|| std::io::Error::other("walk loop"))
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

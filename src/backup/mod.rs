//! Snapshot capture, discovery, upload, and cataloging
//!
//! One coordinator run produces one point-in-time snapshot of the local
//! node's data: request the snapshot through the admin interface, discover
//! the per-keyspace artifacts it created on disk, hand them to the artifact
//! store, publish the manifest, and always clear the snapshot again so disk
//! usage never accumulates - cleanup runs on every exit path.

mod admin;
mod coordinator;
mod discovery;
mod store;

pub use admin::{CommandAdmin, NodeAdmin};
pub use coordinator::SnapshotCoordinator;
pub use discovery::{discover_keyspace_snapshots, snapshot_files, KeyspaceSnapshot};
pub use store::{ArtifactStore, LocalArtifactStore, LocalManifestStore, ManifestStore};

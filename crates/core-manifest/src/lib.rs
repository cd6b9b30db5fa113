//! Snapshot manifest data structures for Halo
//!
//! One snapshot run produces exactly one manifest: the durable catalog of
//! every artifact that was captured and uploaded under a single snapshot tag.
//! The manifest is the record a restore tooling reads to know what exists.
//!
//! # Key concepts
//!
//! - **Snapshot tag**: timestamp-derived identifier naming one cluster-wide,
//!   point-in-time snapshot. Filesystem-path-safe, second resolution.
//! - **Artifact reference**: one file discovered under a keyspace's snapshot
//!   directory and uploaded; never mutated after creation.
//! - **Snapshot manifest**: the ordered collection of artifact references for
//!   one tag, published once, immutable afterwards.
//!
//! # Example
//!
//! ```
//! use halo_core_manifest::{ArtifactKind, ArtifactRef, SnapshotManifest, SnapshotTag};
//! use chrono::{TimeZone, Utc};
//!
//! let when = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let tag = SnapshotTag::from_datetime(when, "%Y%m%d%H%M%S");
//! assert_eq!(tag.as_str(), "20240101000000");
//!
//! let mut manifest = SnapshotManifest::new(tag);
//! manifest.add_artifact(ArtifactRef::new("ks1", "/data/ks1/a.db", ArtifactKind::Snapshot));
//! assert_eq!(manifest.artifacts.len(), 1);
//! ```

pub mod error;
pub mod snapshot;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use snapshot::{ArtifactKind, ArtifactRef, SnapshotManifest, SnapshotTag};

/// Schema version for the snapshot manifest
pub const SNAPSHOT_MANIFEST_SCHEMA_VERSION: &str = "halo.snapshot.v1";

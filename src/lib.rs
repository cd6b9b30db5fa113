/*!
 * Halo - operational sidecar for distributed-database nodes
 *
 * Runs alongside each node of a cluster and performs two recurring
 * reconciliation duties:
 * - keep firewall ACLs converged with the live cluster membership, so
 *   inter-node and cross-region traffic stays authorized as nodes join and
 *   leave
 * - coordinate daily point-in-time snapshot capture, discovery, upload, and
 *   cataloging for disaster recovery
 *
 * Collaborators (membership registry, firewall provider, node admin
 * interface, artifact and manifest stores) are trait seams taken at
 * construction time, so deployments plug in their own clients and tests
 * substitute doubles.
 */

pub mod acl;
pub mod backup;
pub mod config;
pub mod error;
pub mod logging;
pub mod schedule;

// Re-export commonly used types
pub use acl::{AclReconciler, ClusterMember, Ports, ReconcileReport};
pub use backup::SnapshotCoordinator;
pub use config::HaloConfig;
pub use error::{HaloError, ProviderError, Result};
pub use schedule::Schedule;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

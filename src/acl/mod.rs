//! Firewall ACL reconciliation
//!
//! Keeps the firewall's inter-node access rules converged with the live
//! cluster membership. Each member is authorized as a single-host CIDR range
//! (`ip/32`) on two traffic classes: the encrypted and the plaintext
//! inter-node protocol ports. The two classes are reconciled independently -
//! one never reads or mutates the other's rule set.
//!
//! The algorithm is a stateless set diff: desired ranges are re-derived from
//! a fresh membership read on every run, so a failed or stale run simply
//! converges on the next tick.

mod provider;
mod reconciler;

pub use provider::{
    ClusterMember, FirewallOp, FirewallProvider, MembershipProvider, PortRange, Ports,
};
pub use reconciler::{AclReconciler, ReconcileOutcome, ReconcileReport};

//! Membership and firewall collaborator seams
//!
//! Both systems own their data: the membership registry owns the member set,
//! the firewall provider owns the rule set. The sidecar holds only
//! run-scoped copies and never caches either across runs.

use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;

/// One member of the cluster, as reported by the membership registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMember {
    /// Logical instance identity
    pub id: String,

    /// Application / cluster name the member registered under
    pub app: String,

    /// Host address inter-node traffic originates from
    pub host_ip: IpAddr,

    /// Availability zone the member runs in
    pub zone: String,
}

impl ClusterMember {
    pub fn new<S: Into<String>>(id: S, app: S, host_ip: IpAddr, zone: S) -> Self {
        Self {
            id: id.into(),
            app: app.into(),
            host_ip,
            zone: zone.into(),
        }
    }

    /// The member's single-host CIDR range, the form all firewall rules use
    pub fn cidr(&self) -> String {
        format!("{}/32", self.host_ip)
    }
}

/// An inclusive port range naming one traffic class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortRange {
    pub from: u16,
    pub to: u16,
}

impl PortRange {
    /// Range covering exactly one port
    pub fn single(port: u16) -> Self {
        Self {
            from: port,
            to: port,
        }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// The two independently reconciled traffic classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ports {
    /// Encrypted inter-node protocol port
    pub secure: u16,
    /// Plaintext inter-node protocol port
    pub plain: u16,
}

impl Ports {
    pub fn secure_range(&self) -> PortRange {
        PortRange::single(self.secure)
    }

    pub fn plain_range(&self) -> PortRange {
        PortRange::single(self.plain)
    }
}

/// Which firewall operation failed, for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirewallOp {
    List,
    Add,
    Remove,
}

impl fmt::Display for FirewallOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FirewallOp::List => "list",
            FirewallOp::Add => "add",
            FirewallOp::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// Cluster membership registry
pub trait MembershipProvider: Send + Sync {
    /// The full current member set for an application (not a delta)
    fn list_members(&self, app: &str) -> Result<Vec<ClusterMember>, ProviderError>;
}

/// Firewall rule management for one port range at a time
///
/// Ranges are CIDR strings in `host/32` form. Implementations cover whatever
/// the deployment's network layer is (cloud security groups, host firewall);
/// the concrete cloud client lives outside this crate.
pub trait FirewallProvider: Send + Sync {
    /// The live rule set for exactly this port range
    fn list_rules(&self, ports: PortRange) -> Result<BTreeSet<String>, ProviderError>;

    /// Authorize all given ranges on this port range in one call
    fn add_rules(&self, ranges: &BTreeSet<String>, ports: PortRange) -> Result<(), ProviderError>;

    /// Revoke all given ranges on this port range in one call
    fn remove_rules(
        &self,
        ranges: &BTreeSet<String>,
        ports: PortRange,
    ) -> Result<(), ProviderError>;
}

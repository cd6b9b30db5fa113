//! Diff-and-apply reconciliation of firewall rules against membership

use super::provider::{
    ClusterMember, FirewallOp, FirewallProvider, MembershipProvider, PortRange, Ports,
};
use crate::error::{HaloError, Result};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// What one port range's reconciliation computed and applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// The port range this outcome is for
    pub ports: PortRange,

    /// Ranges that were missing from the live set and got added
    pub added: BTreeSet<String>,

    /// Live ranges with no backing member that got removed
    pub removed: BTreeSet<String>,
}

impl ReconcileOutcome {
    /// Whether any mutation call was issued for this port range
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Result of one full reconcile run across both traffic classes
///
/// Callers that need "rules changed at least once" semantics aggregate
/// returned reports; the reconciler itself keeps no state between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub secure: ReconcileOutcome,
    pub plain: ReconcileOutcome,
    /// Size of the membership set the run reconciled against
    pub member_count: usize,
}

impl ReconcileReport {
    /// Whether any mutation call was issued in this run
    pub fn changed(&self) -> bool {
        self.secure.changed() || self.plain.changed()
    }
}

/// Converges firewall state with cluster membership
///
/// For each of the two port ranges, makes the live rule set exactly equal to
/// `{member.host_ip/32}` over the current members. Additions and removals
/// are batched into at most one call each; a run with nothing to change
/// issues no mutation calls at all, which makes the operation idempotent.
pub struct AclReconciler {
    membership: Arc<dyn MembershipProvider>,
    firewall: Arc<dyn FirewallProvider>,
    app: String,
    ports: Ports,
}

impl AclReconciler {
    pub fn new(
        membership: Arc<dyn MembershipProvider>,
        firewall: Arc<dyn FirewallProvider>,
        app: impl Into<String>,
        ports: Ports,
    ) -> Self {
        Self {
            membership,
            firewall,
            app: app.into(),
            ports,
        }
    }

    /// Read membership and reconcile both traffic classes
    ///
    /// Any provider failure abandons the run; there is no partial retry
    /// inside one call. The next scheduled run re-derives the full diff from
    /// a fresh read, which is safe because nothing is cached across runs.
    pub fn execute(&self) -> Result<ReconcileReport> {
        let members = self
            .membership
            .list_members(&self.app)
            .map_err(|e| HaloError::Membership(e.to_string()))?;

        let report = self.reconcile(&members)?;

        info!(
            app = %self.app,
            members = report.member_count,
            added = report.secure.added.len() + report.plain.added.len(),
            removed = report.secure.removed.len() + report.plain.removed.len(),
            changed = report.changed(),
            "acl reconcile run complete"
        );
        Ok(report)
    }

    /// Reconcile both traffic classes against an already-fetched member set
    pub fn reconcile(&self, members: &[ClusterMember]) -> Result<ReconcileReport> {
        let desired: BTreeSet<String> = members.iter().map(|m| m.cidr()).collect();

        // Each class is read, diffed, and mutated against its own port range
        // only. The ordering between the two classes carries no meaning.
        let secure = self.reconcile_range(&desired, self.ports.secure_range())?;
        let plain = self.reconcile_range(&desired, self.ports.plain_range())?;

        Ok(ReconcileReport {
            secure,
            plain,
            member_count: members.len(),
        })
    }

    fn reconcile_range(
        &self,
        desired: &BTreeSet<String>,
        ports: PortRange,
    ) -> Result<ReconcileOutcome> {
        let live = self
            .firewall
            .list_rules(ports)
            .map_err(|e| HaloError::firewall(FirewallOp::List, ports, e))?;

        let to_add: BTreeSet<String> = desired.difference(&live).cloned().collect();
        let to_remove: BTreeSet<String> = live.difference(desired).cloned().collect();

        debug!(
            %ports,
            live = live.len(),
            desired = desired.len(),
            to_add = to_add.len(),
            to_remove = to_remove.len(),
            "computed acl diff"
        );

        if !to_add.is_empty() {
            self.firewall
                .add_rules(&to_add, ports)
                .map_err(|e| HaloError::firewall(FirewallOp::Add, ports, e))?;
            info!(%ports, ranges = ?to_add, "authorized ranges");
        }

        if !to_remove.is_empty() {
            self.firewall
                .remove_rules(&to_remove, ports)
                .map_err(|e| HaloError::firewall(FirewallOp::Remove, ports, e))?;
            info!(%ports, ranges = ?to_remove, "revoked ranges");
        }

        Ok(ReconcileOutcome {
            ports,
            added: to_add,
            removed: to_remove,
        })
    }
}

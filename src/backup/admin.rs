//! Node administrative interface
//!
//! The local management surface used to request snapshot capture and
//! cleanup on the node's data engine. Calls may fail transiently while the
//! node is starting up or under load; callers wrap them in the retry
//! primitive.

use crate::error::ProviderError;
use halo_core_manifest::SnapshotTag;
use std::process::Command;
use tracing::debug;

/// Snapshot capture/clear on the node's data engine
pub trait NodeAdmin: Send + Sync {
    /// Request a snapshot under `tag`, optionally limited to one keyspace
    /// and a set of tables. The engine creates a directory named after the
    /// tag under every participating keyspace's `snapshots` directory.
    fn take_snapshot(
        &self,
        tag: &SnapshotTag,
        keyspace: Option<&str>,
        tables: &[String],
    ) -> Result<(), ProviderError>;

    /// Remove the on-disk snapshot for `tag`
    fn clear_snapshot(&self, tag: &SnapshotTag) -> Result<(), ProviderError>;
}

/// Admin interface backed by the node's management command (`nodetool` or
/// equivalent)
pub struct CommandAdmin {
    command: String,
}

impl CommandAdmin {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<(), ProviderError> {
        debug!(command = %self.command, ?args, "invoking admin command");
        let output = Command::new(&self.command).args(args).output()?;
        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ProviderError::new(format!(
                "{} {} exited with {}: {}",
                self.command,
                args.join(" "),
                output.status,
                stderr.trim()
            )))
        }
    }
}

impl NodeAdmin for CommandAdmin {
    fn take_snapshot(
        &self,
        tag: &SnapshotTag,
        keyspace: Option<&str>,
        tables: &[String],
    ) -> Result<(), ProviderError> {
        let mut args = vec!["snapshot", "-t", tag.as_str()];
        let joined;
        if !tables.is_empty() {
            joined = tables.join(",");
            args.push("-cf");
            args.push(&joined);
        }
        if let Some(ks) = keyspace {
            args.push(ks);
        }
        self.run(&args)
    }

    fn clear_snapshot(&self, tag: &SnapshotTag) -> Result<(), ProviderError> {
        self.run(&["clearsnapshot", "-t", tag.as_str()])
    }
}

/*!
 * Error types for Halo
 */

use crate::acl::{FirewallOp, PortRange};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HaloError>;

/// Failure raised by a collaborator implementation (membership registry,
/// firewall provider, node admin interface, artifact or manifest store).
///
/// Collaborators report what went wrong; the component that called them
/// attaches the run context (which port range, which operation, which file)
/// when it wraps the failure into [`HaloError`].
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        ProviderError(message.into())
    }
}

impl From<io::Error> for ProviderError {
    fn from(e: io::Error) -> Self {
        ProviderError(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum HaloError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error (data-root enumeration, local file reads)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Membership registry read failed; the whole reconcile run is abandoned
    #[error("membership query failed: {0}")]
    Membership(String),

    /// A firewall call failed; carries which port range and which operation.
    /// Not retried internally: the next scheduled run re-derives the full
    /// diff from scratch.
    #[error("firewall {operation} failed for port range {ports}: {message}")]
    Firewall {
        operation: FirewallOp,
        ports: PortRange,
        message: String,
    },

    /// An administrative call exhausted its retry budget
    #[error("admin {op} failed after {attempts} attempts: {message}")]
    AdminExhausted {
        op: &'static str,
        attempts: u32,
        message: String,
    },

    /// Upload of one artifact failed; aborts the run before publication
    #[error("upload failed for {path}: {message}")]
    Upload { path: PathBuf, message: String },

    /// Manifest publication failed; fatal for the run, never retried
    #[error("manifest publication failed: {0}")]
    ManifestPublish(String),
}

impl HaloError {
    /// Create a firewall error with run context
    pub fn firewall(operation: FirewallOp, ports: PortRange, source: ProviderError) -> Self {
        HaloError::Firewall {
            operation,
            ports,
            message: source.to_string(),
        }
    }
}

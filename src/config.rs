/*!
 * Configuration types for Halo
 */

use crate::acl::Ports;
use crate::error::{HaloError, Result};
use halo_core_retry::{Backoff, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to a tracing level
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Main sidecar configuration
///
/// Loaded from a TOML file; every field has a deployment-sensible default so
/// a minimal config only names what differs on this cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaloConfig {
    /// Application / cluster name the membership registry is queried with
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Encrypted inter-node protocol port
    #[serde(default = "default_secure_port")]
    pub secure_port: u16,

    /// Plaintext inter-node protocol port
    #[serde(default = "default_plain_port")]
    pub plain_port: u16,

    /// Whether this node is a seed member (first per availability zone).
    /// Seeds run ACL reconciliation on a recurring schedule; other nodes run
    /// it once at startup.
    #[serde(default)]
    pub seed: bool,

    /// Base interval between seed reconcile runs, in seconds
    #[serde(default = "default_acl_interval")]
    pub acl_interval_secs: u64,

    /// Upper bound of the random jitter added to the interval once at
    /// schedule creation, in seconds
    #[serde(default = "default_acl_jitter")]
    pub acl_jitter_secs: u64,

    /// Root of the node's data directories (one subdirectory per keyspace)
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    /// Root the local artifact and manifest stores write under
    #[serde(default = "default_backup_root")]
    pub backup_root: PathBuf,

    /// Hour of day (UTC) the daily snapshot backup fires
    #[serde(default = "default_backup_hour")]
    pub backup_hour: u32,

    /// chrono format string the snapshot tag is rendered with. Must be
    /// filesystem-path-safe and match what the admin snapshot call creates
    /// on disk.
    #[serde(default = "default_tag_format")]
    pub snapshot_tag_format: String,

    /// Command the node admin collaborator shells out to
    #[serde(default = "default_admin_command")]
    pub admin_command: String,

    /// Number of attempts for administrative calls
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base delay between retry attempts, in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Use exponential backoff between retry attempts
    #[serde(default)]
    pub exponential_backoff: bool,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stdout)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

fn default_app_name() -> String {
    "halo".to_string()
}

fn default_secure_port() -> u16 {
    7001
}

fn default_plain_port() -> u16 {
    7000
}

fn default_acl_interval() -> u64 {
    120
}

fn default_acl_jitter() -> u64 {
    120
}

fn default_data_root() -> PathBuf {
    PathBuf::from("/var/lib/cassandra/data")
}

fn default_backup_root() -> PathBuf {
    PathBuf::from("/var/lib/halo/backups")
}

fn default_backup_hour() -> u32 {
    12
}

fn default_tag_format() -> String {
    "%Y%m%d%H%M%S".to_string()
}

fn default_admin_command() -> String {
    "nodetool".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    5
}

impl Default for HaloConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            secure_port: default_secure_port(),
            plain_port: default_plain_port(),
            seed: false,
            acl_interval_secs: default_acl_interval(),
            acl_jitter_secs: default_acl_jitter(),
            data_root: default_data_root(),
            backup_root: default_backup_root(),
            backup_hour: default_backup_hour(),
            snapshot_tag_format: default_tag_format(),
            admin_command: default_admin_command(),
            retry_attempts: default_retry_attempts(),
            retry_delay_secs: default_retry_delay(),
            exponential_backoff: false,
            log_level: LogLevel::default(),
            log_file: None,
            verbose: false,
        }
    }
}

impl HaloConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            HaloError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: HaloConfig = toml::from_str(&contents)
            .map_err(|e| HaloError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.app_name.is_empty() {
            return Err(HaloError::Config("app_name must not be empty".to_string()));
        }
        if self.secure_port == 0 || self.plain_port == 0 {
            return Err(HaloError::Config("ports must be non-zero".to_string()));
        }
        if self.secure_port == self.plain_port {
            return Err(HaloError::Config(
                "secure_port and plain_port must differ".to_string(),
            ));
        }
        if self.backup_hour >= 24 {
            return Err(HaloError::Config(format!(
                "backup_hour must be 0-23, got {}",
                self.backup_hour
            )));
        }
        if self.snapshot_tag_format.is_empty() {
            return Err(HaloError::Config(
                "snapshot_tag_format must not be empty".to_string(),
            ));
        }
        // The rendered tag has to be usable as a directory name
        let rendered = chrono::Utc::now()
            .format(&self.snapshot_tag_format)
            .to_string();
        if rendered.is_empty() || rendered.contains('/') {
            return Err(HaloError::Config(format!(
                "snapshot_tag_format renders to a non-path-safe tag: {:?}",
                rendered
            )));
        }
        if self.retry_attempts == 0 {
            return Err(HaloError::Config(
                "retry_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The two independently reconciled traffic classes
    pub fn ports(&self) -> Ports {
        Ports {
            secure: self.secure_port,
            plain: self.plain_port,
        }
    }

    /// Retry policy for administrative calls
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts,
            delay: Duration::from_secs(self.retry_delay_secs),
            backoff: if self.exponential_backoff {
                Backoff::Exponential
            } else {
                Backoff::Fixed
            },
        }
    }
}

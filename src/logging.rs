/*!
 * Logging and tracing initialization
 */

use std::fs::File;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::HaloConfig;
use crate::error::{HaloError, Result};

/// Initialize structured logging from the sidecar configuration
///
/// Without a `log_file` the output is compact human-readable lines on
/// stdout. With one, the sidecar writes JSON lines so whatever ships the
/// node's logs can forward them without a parser of its own.
pub fn init_logging(config: &HaloConfig) -> Result<()> {
    let log_level = if config.verbose {
        Level::DEBUG
    } else {
        config.log_level.to_tracing_level()
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("halo={}", log_level)))
        .map_err(|e| HaloError::Config(format!("failed to create log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_file {
        Some(ref log_path) => {
            let file = File::create(log_path).map_err(|e| {
                HaloError::Config(format!("failed to create log file {}: {}", log_path.display(), e))
            })?;
            let layer = fmt::layer()
                .with_writer(file)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_ansi(false)
                .json();
            registry.with(layer).init();
        }
        None => {
            let layer = fmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE)
                .compact();
            registry.with(layer).init();
        }
    }

    Ok(())
}

/// Initialize logging with a test writer; safe to call from many tests
#[cfg(test)]
pub fn init_test_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("halo=debug"));

        let fmt_layer = fmt::layer().with_test_writer().with_target(false).compact();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .ok();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_verbose_overrides_log_level() {
        let config = HaloConfig {
            log_level: LogLevel::Error,
            verbose: true,
            ..Default::default()
        };

        // When verbose is set the effective level is DEBUG
        assert!(config.verbose);
        assert_eq!(config.log_level, LogLevel::Error);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Error.to_tracing_level(), Level::ERROR);
        assert_eq!(LogLevel::Warn.to_tracing_level(), Level::WARN);
        assert_eq!(LogLevel::Info.to_tracing_level(), Level::INFO);
        assert_eq!(LogLevel::Debug.to_tracing_level(), Level::DEBUG);
        assert_eq!(LogLevel::Trace.to_tracing_level(), Level::TRACE);
    }

    #[test]
    fn test_unwritable_log_file_is_a_config_error() {
        let config = HaloConfig {
            log_file: Some("/nonexistent-halo-dir/halo.log".into()),
            ..Default::default()
        };
        assert!(matches!(
            init_logging(&config),
            Err(HaloError::Config(_))
        ));
    }
}

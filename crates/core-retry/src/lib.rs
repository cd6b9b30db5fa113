//! Bounded retry with backoff for Halo
//!
//! Local management interfaces (the node's admin surface) can be briefly
//! unreachable during startup or under load. This crate wraps a fallible
//! operation in a bounded retry loop so transient unavailability is absorbed
//! instead of failing a whole scheduled run.
//!
//! The contract is deliberately narrow:
//! - the first success returns immediately, no further attempts
//! - between attempts the caller's thread sleeps per the configured backoff
//! - on exhaustion the *last* underlying error is returned, wrapped in
//!   [`RetryError::Exhausted`]
//!
//! Retried operations must be idempotent or safe to repeat from the caller's
//! perspective. This primitive dedupes reporting, not side effects.
//!
//! # Example
//!
//! ```
//! use halo_core_retry::{run_with_retry, Backoff, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy {
//!     max_attempts: 3,
//!     delay: Duration::from_millis(10),
//!     backoff: Backoff::Fixed,
//! };
//!
//! let mut calls = 0;
//! let result: Result<u32, _> = run_with_retry(&policy, || {
//!     calls += 1;
//!     if calls < 2 {
//!         Err("not yet")
//!     } else {
//!         Ok(42)
//!     }
//! });
//!
//! assert_eq!(result.unwrap(), 42);
//! assert_eq!(calls, 2);
//! ```

use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Result type for retried operations
pub type Result<T, E> = std::result::Result<T, RetryError<E>>;

/// Failure of a retried operation
#[derive(Error, Debug)]
pub enum RetryError<E> {
    /// All attempts failed; carries the final underlying error
    #[error("operation failed after {attempts} attempts: {source}")]
    Exhausted {
        /// Number of attempts actually made
        attempts: u32,
        /// The last underlying failure
        source: E,
    },
}

impl<E> RetryError<E> {
    /// Consume the wrapper and return the final underlying error
    pub fn into_source(self) -> E {
        match self {
            RetryError::Exhausted { source, .. } => source,
        }
    }
}

/// Delay progression between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed,
    /// Delay doubles after each failed attempt
    Exponential,
}

/// Retry behaviour for one call site, sourced from configuration
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of invocations (must be at least 1)
    pub max_attempts: u32,
    /// Base delay between attempts
    pub delay: Duration,
    /// Delay progression
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before the given retry (1-based: retry 1 follows the
    /// first failed attempt)
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential => {
                // Saturate instead of overflowing for absurd attempt counts
                let factor = 2u32.checked_pow(retry.saturating_sub(1)).unwrap_or(u32::MAX);
                self.delay.saturating_mul(factor)
            }
        }
    }
}

/// Execute `op` up to `policy.max_attempts` times, sleeping between attempts.
///
/// Returns the first success, or [`RetryError::Exhausted`] wrapping the last
/// failure once the budget is spent. A `max_attempts` of zero is treated as
/// one attempt; a zero-attempt call that can never report an error is not a
/// useful contract.
pub fn run_with_retry<T, E, F>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> std::result::Result<T, E>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error: Option<E> = None;

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            let delay = policy.delay_before_retry(attempt - 1);
            thread::sleep(delay);
        }

        match op() {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(attempt, max_attempts, error = %e, "attempt failed");
                last_error = Some(e);
            }
        }
    }

    // last_error is always set here: the loop runs at least once and only
    // falls through on failure
    Err(RetryError::Exhausted {
        attempts: max_attempts,
        source: last_error.expect("at least one attempt was made"),
    })
}

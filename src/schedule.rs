/*!
 * Scheduling-trigger glue
 *
 * The sidecar does not implement a scheduler; it only expresses each job's
 * next-run policy so whatever drives it (the bundled tick loop in `main`, or
 * an embedding process) can compute fire times. The external driver
 * guarantees non-overlapping invocations of the same job.
 */

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use std::time::Duration;

/// Next-run policy for one scheduled job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Run once at startup, never again
    Once,
    /// Recur at a fixed period. Jitter, if any, was folded into the period
    /// once at schedule creation.
    Interval { period: Duration },
    /// Calendar-based daily trigger at a fixed wall-clock time (UTC)
    Daily { hour: u32, minute: u32, second: u32 },
}

impl Schedule {
    /// Fixed-interval schedule with uniform random jitter applied once, at
    /// creation time, from a locally scoped RNG. Jittering the period (and
    /// not every tick) keeps a fleet of nodes from synchronizing their
    /// firewall-API bursts while leaving each node's cadence steady.
    pub fn interval_with_jitter(base: Duration, jitter: Duration) -> Self {
        let jitter_ms = u64::try_from(jitter.as_millis()).unwrap_or(u64::MAX);
        let period = if jitter_ms == 0 {
            base
        } else {
            let extra_ms = rand::rng().random_range(0..jitter_ms);
            base + Duration::from_millis(extra_ms)
        };
        Schedule::Interval { period }
    }

    /// Daily trigger at the given hour, minute 1, second 0
    ///
    /// Minute 1 rather than 0 keeps the snapshot request clear of the
    /// top-of-hour load spike other hourly jobs produce on the node.
    pub fn daily_at_hour(hour: u32) -> Self {
        Schedule::Daily {
            hour,
            minute: 1,
            second: 0,
        }
    }

    /// The schedule's next fire time strictly after `now`, or `None` for a
    /// one-shot schedule that has already had its startup run
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match *self {
            Schedule::Once => None,
            Schedule::Interval { period } => {
                let period = ChronoDuration::from_std(period).unwrap_or(ChronoDuration::MAX);
                now.checked_add_signed(period)
            }
            Schedule::Daily {
                hour,
                minute,
                second,
            } => {
                let today = now
                    .date_naive()
                    .and_hms_opt(hour, minute, second)?
                    .and_utc();
                if today > now {
                    Some(today)
                } else {
                    today.checked_add_signed(ChronoDuration::days(1))
                }
            }
        }
    }
}

/// Reconciliation schedule for a member
///
/// Seeds recur with jitter; everyone else runs once at process startup.
/// Only seeds are expected to observe membership changes promptly, which is
/// a deliberate cost/consistency trade-off for large fleets.
pub fn acl_schedule(seed: bool, base: Duration, jitter: Duration) -> Schedule {
    if seed {
        Schedule::interval_with_jitter(base, jitter)
    } else {
        Schedule::Once
    }
}

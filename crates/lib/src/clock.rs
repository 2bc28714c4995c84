//! Time provider abstraction
//!
//! This module provides a [`Clock`] trait that abstracts over time sources,
//! allowing production code to use real system time while tests can move time
//! past a grant's expiry without sleeping.
//!
//! # Example
//!
//! ```
//! use userd::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let now = clock.now();
//! assert_eq!(now.timestamp_subsec_nanos(), 0);
//! ```

use std::fmt::Debug;

use chrono::{DateTime, SubsecRound, Utc};

#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;

/// A time provider for creation, grant and expiry timestamps.
///
/// Timestamps are persisted as RFC3339 with whole seconds, so every clock
/// reports whole seconds to keep stored and in-memory values identical.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time, truncated to whole seconds.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }
}

/// Test clock that only moves when told to.
///
/// # Example
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use userd::{Clock, FixedClock};
///
/// let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
/// let t1 = clock.now();
/// clock.advance(Duration::hours(2));
/// assert_eq!(clock.now() - t1, Duration::hours(2));
/// ```
#[cfg(any(test, feature = "testing"))]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

#[cfg(any(test, feature = "testing"))]
impl FixedClock {
    /// Create a clock frozen at `now` (sub-second precision is dropped).
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now.trunc_subsecs(0)),
        }
    }

    /// Move the clock forward (or backward, for a negative duration).
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }

    /// Set the clock to a specific instant.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap() = at.trunc_subsecs(0);
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default())
    }
}

#[cfg(any(test, feature = "testing"))]
impl Debug for FixedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedClock")
            .field("now", &*self.now.lock().unwrap())
            .finish()
    }
}

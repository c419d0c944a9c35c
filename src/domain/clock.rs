//! Clock abstraction so temporal queries are deterministic under test.
//!
//! The core has no internal timers; hosts query on whatever cadence they
//! choose and the clock only answers "what time is it now".

use chrono::{DateTime, Utc};

/// Source of "now" for timeline computations.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time; the default for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant. Used by tests and by hosts that want
/// to drive recomputation against an explicit timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

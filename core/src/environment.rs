//! Injected dependencies that are not storage.

use chrono::{DateTime, Utc};

/// Clock trait - Time operations.
///
/// Engines read time through this trait so tests can pin it.
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

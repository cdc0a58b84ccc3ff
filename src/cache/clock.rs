//! Time source abstraction for entry expiry.
//!
//! Expiry decisions go through a [`Clock`] so tests can advance time without
//! sleeping.

use std::sync::RwLock;
use std::time::Duration;

use time::OffsetDateTime;

use super::lock::rw_write;

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall-clock time; the production clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock that only moves when told to. Test use only, but kept in the
/// library so integration tests can drive store expiry.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<OffsetDateTime>,
}

impl ManualClock {
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = rw_write(&self.now, "cache::clock", "advance");
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

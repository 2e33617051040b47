use chrono::{Local, NaiveDateTime};

use pulsar_core::Clock;

/// Real-time clock backed by the local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

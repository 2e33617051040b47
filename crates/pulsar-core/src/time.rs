use chrono::{NaiveDate, NaiveDateTime};

/// Clock abstracts access to the current local time so services remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current naive local timestamp.
    fn now(&self) -> NaiveDateTime;

    /// Returns the current local date. Defaults to `now().date()`.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

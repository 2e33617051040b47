use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Average month length used when a month interval is fractional.
pub const AVERAGE_DAYS_PER_MONTH: f64 = 30.437;
/// Average year length used when a year interval is fractional.
pub const AVERAGE_DAYS_PER_YEAR: f64 = 365.25;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    /// Plural tag used by the persisted rule format (`Days`, `Weeks`, ...).
    pub fn tag(&self) -> &'static str {
        match self {
            TimeUnit::Day => "Days",
            TimeUnit::Week => "Weeks",
            TimeUnit::Month => "Months",
            TimeUnit::Year => "Years",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeUnit::Day => "Day",
            TimeUnit::Week => "Week",
            TimeUnit::Month => "Month",
            TimeUnit::Year => "Year",
        };
        f.write_str(label)
    }
}

impl FromStr for TimeUnit {
    type Err = UnknownTimeUnit;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(TimeUnit::Day),
            "week" | "weeks" => Ok(TimeUnit::Week),
            "month" | "months" => Ok(TimeUnit::Month),
            "year" | "years" => Ok(TimeUnit::Year),
            _ => Err(UnknownTimeUnit(value.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raised when a unit tag is not one of day/week/month/year.
pub struct UnknownTimeUnit(pub String);

impl fmt::Display for UnknownTimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown time unit `{}` (expected Days, Weeks, Months or Years)",
            self.0
        )
    }
}

impl std::error::Error for UnknownTimeUnit {}

/// A repeat interval such as "every 2 weeks" or "every 1.5 months".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeInterval {
    pub every: f64,
    pub unit: TimeUnit,
}

impl TimeInterval {
    pub fn new(every: f64, unit: TimeUnit) -> Self {
        Self { every, unit }
    }

    /// Adds this interval to `from`.
    ///
    /// Days and weeks are elapsed-time additions and accept fractions. Whole
    /// months and years are calendar additions that keep the day of month,
    /// clamping to the last day when the target month is shorter. Fractional
    /// months and years fall back to elapsed time using
    /// [`AVERAGE_DAYS_PER_MONTH`] and [`AVERAGE_DAYS_PER_YEAR`], so
    /// `0.5 Month` is 15.2185 days rather than "half of this month".
    ///
    /// Returns `None` only when the result leaves the representable range.
    pub fn advance(&self, from: NaiveDateTime) -> Option<NaiveDateTime> {
        match self.unit {
            TimeUnit::Day => add_days(from, self.every),
            TimeUnit::Week => add_days(from, self.every * 7.0),
            TimeUnit::Month => match whole(self.every) {
                Some(months) => shift_month(from, months),
                None => add_days(from, self.every * AVERAGE_DAYS_PER_MONTH),
            },
            TimeUnit::Year => match whole(self.every) {
                Some(years) => shift_year(from, years),
                None => add_days(from, self.every * AVERAGE_DAYS_PER_YEAR),
            },
        }
    }

    pub fn label(&self) -> String {
        match (whole(self.every), self.unit) {
            (Some(1), TimeUnit::Day) => "Daily".into(),
            (Some(1), TimeUnit::Week) => "Weekly".into(),
            (Some(1), TimeUnit::Month) => "Monthly".into(),
            (Some(1), TimeUnit::Year) => "Yearly".into(),
            (Some(n), unit) => format!("Every {} {}s", n, unit),
            (None, unit) => format!("Every {} {}s", self.every, unit),
        }
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn whole(value: f64) -> Option<i32> {
    if value.fract() == 0.0 && value.abs() <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

fn add_days(from: NaiveDateTime, days: f64) -> Option<NaiveDateTime> {
    let millis = (days * MILLIS_PER_DAY).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    let delta = Duration::try_milliseconds(millis as i64)?;
    from.checked_add_signed(delta)
}

fn shift_month(from: NaiveDateTime, months: i32) -> Option<NaiveDateTime> {
    let date = from.date();
    let index = date.year().checked_mul(12)? + date.month0() as i32;
    let target = index.checked_add(months)?;
    let year = target.div_euclid(12);
    let month = target.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.and_time(from.time()))
}

fn shift_year(from: NaiveDateTime, years: i32) -> Option<NaiveDateTime> {
    let date = from.date();
    let year = date.year().checked_add(years)?;
    let month = date.month();
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.and_time(from.time()))
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    first_next.pred_opt().map(|last| last.day())
}

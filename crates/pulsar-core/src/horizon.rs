//! Conversion of a fractional-year horizon into a concrete cutoff date.

use chrono::NaiveDateTime;

use pulsar_domain::{TimeInterval, TimeUnit};

use crate::CoreError;

/// Returns `now + years`.
///
/// Horizons that are a whole number of months ("3 Months" is 0.25 years) use
/// calendar month addition, so 0.25 years from 2024-01-01 is 2024-04-01. Any
/// other value uses the average-length year of [`TimeInterval::advance`].
pub fn horizon_date(now: NaiveDateTime, years: f64) -> Result<NaiveDateTime, CoreError> {
    if !years.is_finite() || years < 0.0 {
        return Err(CoreError::HorizonOutOfRange(years));
    }
    let months = years * 12.0;
    let interval = if months.fract() == 0.0 {
        TimeInterval::new(months, TimeUnit::Month)
    } else {
        TimeInterval::new(years, TimeUnit::Year)
    };
    interval
        .advance(now)
        .ok_or(CoreError::HorizonOutOfRange(years))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pulsar_domain::parse_timestamp;

    fn ts(input: &str) -> NaiveDateTime {
        parse_timestamp(input).unwrap()
    }

    #[test]
    fn whole_month_horizons_are_calendar_aware() {
        assert_eq!(horizon_date(ts("2024-01-01"), 0.25).unwrap(), ts("2024-04-01"));
        assert_eq!(horizon_date(ts("2024-08-31"), 0.5).unwrap(), ts("2025-02-28"));
        assert_eq!(horizon_date(ts("2024-01-01"), 10.0).unwrap(), ts("2034-01-01"));
        assert_eq!(horizon_date(ts("2024-01-01"), 0.0).unwrap(), ts("2024-01-01"));
    }

    #[test]
    fn odd_horizons_use_average_year() {
        let out = horizon_date(ts("2024-01-01"), 0.1).unwrap();
        assert_eq!(out, ts("2024-01-01") + Duration::minutes(52_596));
    }

    #[test]
    fn negative_or_non_finite_horizons_are_rejected() {
        assert!(horizon_date(ts("2024-01-01"), -1.0).is_err());
        assert!(horizon_date(ts("2024-01-01"), f64::NAN).is_err());
    }
}

//! Shared timestamp formats and helpers.

use chrono::{NaiveDate, NaiveDateTime};

/// Timestamp layout used by persisted rows and exports.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Date-only layout accepted from user input.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Parses `YYYY-MM-DD HH:MM:SS`, falling back to a bare `YYYY-MM-DD` at midnight.
pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let trimmed = input.trim();
    NaiveDateTime::parse_from_str(trimmed, DATE_TIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

/// Signed distance `to - from` in fractional days.
pub fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta = to - from;
    delta.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_layouts() {
        let full = parse_timestamp("2024-01-05 08:30:00").unwrap();
        assert_eq!(format_timestamp(full), "2024-01-05 08:30:00");
        let bare = parse_timestamp("2024-01-05").unwrap();
        assert_eq!(format_timestamp(bare), "2024-01-05 00:00:00");
        assert!(parse_timestamp("05/01/2024").is_none());
    }

    #[test]
    fn days_between_is_fractional() {
        let from = parse_timestamp("2024-01-01").unwrap();
        let to = parse_timestamp("2024-01-02 12:00:00").unwrap();
        assert!((days_between(from, to) - 1.5).abs() < 1e-9);
        assert!((days_between(to, from) + 1.5).abs() < 1e-9);
    }
}

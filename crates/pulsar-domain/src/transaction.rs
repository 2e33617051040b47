//! Domain models for one-time transactions and recurring rules.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::time_interval::{TimeInterval, TimeUnit};

/// Suffix appended to descriptions of occurrences archived from a deleted rule.
pub const ARCHIVED_SUFFIX: &str = " (Archived)";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A single dated income (positive) or expense (negative).
pub struct StaticTransaction {
    pub timestamp: NaiveDateTime,
    pub description: String,
    pub amount: f64,
}

impl StaticTransaction {
    pub fn new(timestamp: NaiveDateTime, description: impl Into<String>, amount: f64) -> Self {
        Self {
            timestamp,
            description: description.into(),
            amount,
        }
    }

    /// Builds the archived copy of a rule occurrence.
    pub fn archived(timestamp: NaiveDateTime, description: &str, amount: f64) -> Self {
        Self::new(timestamp, format!("{description}{ARCHIVED_SUFFIX}"), amount)
    }

    pub fn is_archived(&self) -> bool {
        self.description.ends_with(ARCHIVED_SUFFIX)
    }

    pub fn is_income(&self) -> bool {
        self.amount >= 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A transaction that repeats every `interval` from `start` until `end`.
pub struct RecurringRule {
    pub start: NaiveDateTime,
    pub description: String,
    pub amount: f64,
    pub interval: TimeInterval,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
}

impl RecurringRule {
    /// Creates a rule after checking the interval and end-date invariants.
    pub fn new(
        start: NaiveDateTime,
        description: impl Into<String>,
        amount: f64,
        interval: TimeInterval,
        end: Option<NaiveDateTime>,
    ) -> Result<Self, RuleError> {
        let rule = Self {
            start,
            description: description.into(),
            amount,
            interval,
            end,
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        let every = self.interval.every;
        if !every.is_finite() || every <= 0.0 {
            return Err(RuleError::NonPositiveInterval(every));
        }
        if let Some(end) = self.end {
            if end < self.start {
                return Err(RuleError::EndBeforeStart {
                    start: self.start,
                    end,
                });
            }
        }
        Ok(())
    }

    pub fn unit(&self) -> TimeUnit {
        self.interval.unit
    }

    /// Whether the rule stopped before `reference`.
    pub fn has_ended(&self, reference: NaiveDateTime) -> bool {
        self.end.is_some_and(|end| end < reference)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Structural violations of a [`RecurringRule`].
pub enum RuleError {
    NonPositiveInterval(f64),
    EndBeforeStart {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::NonPositiveInterval(every) => {
                write!(f, "interval must be a positive number, got {every}")
            }
            RuleError::EndBeforeStart { start, end } => {
                write!(f, "end date {end} is before start date {start}")
            }
        }
    }
}

impl std::error::Error for RuleError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::parse_timestamp;

    fn rule(every: f64, end: Option<&str>) -> Result<RecurringRule, RuleError> {
        RecurringRule::new(
            parse_timestamp("2024-01-05").unwrap(),
            "Rent",
            -500.0,
            TimeInterval::new(every, TimeUnit::Month),
            end.and_then(parse_timestamp),
        )
    }

    #[test]
    fn rejects_non_positive_or_non_finite_intervals() {
        assert_eq!(rule(0.0, None), Err(RuleError::NonPositiveInterval(0.0)));
        assert!(rule(-1.0, None).is_err());
        assert!(rule(f64::NAN, None).is_err());
        assert!(rule(f64::INFINITY, None).is_err());
        assert!(rule(0.25, None).is_ok());
    }

    #[test]
    fn rejects_end_before_start() {
        assert!(matches!(
            rule(1.0, Some("2024-01-01")),
            Err(RuleError::EndBeforeStart { .. })
        ));
        assert!(rule(1.0, Some("2024-01-05")).is_ok());
    }

    #[test]
    fn archived_copies_carry_suffix() {
        let txn = StaticTransaction::archived(parse_timestamp("2024-02-05").unwrap(), "Rent", -500.0);
        assert_eq!(txn.description, "Rent (Archived)");
        assert!(txn.is_archived());
        assert!(!txn.is_income());
    }

    #[test]
    fn rules_serialize_with_optional_end() {
        let rule = rule(1.0, None).unwrap();
        let json = serde_json::to_string(&rule).unwrap();
        let back: RecurringRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
        assert!(back.end.is_none());
    }
}

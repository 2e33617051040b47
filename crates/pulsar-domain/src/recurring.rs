//! Expansion of recurring rules into concrete dated occurrences.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::common::days_between;
use crate::transaction::{RecurringRule, StaticTransaction};

/// Upper bound on occurrences produced for one rule in one expansion. Covers a
/// one-minute cadence across the longest horizon.
pub const MAX_OCCURRENCES: usize = 10_000_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Where an occurrence came from.
pub enum Origin {
    Static,
    Recurring,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Origin::Static => "Static",
            Origin::Recurring => "Recurring",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One dated, amount-bearing event contributing to the balance.
pub struct Occurrence {
    pub timestamp: NaiveDateTime,
    pub description: String,
    pub amount: f64,
    pub origin: Origin,
}

impl From<&StaticTransaction> for Occurrence {
    fn from(txn: &StaticTransaction) -> Self {
        Self {
            timestamp: txn.timestamp,
            description: txn.description.clone(),
            amount: txn.amount,
            origin: Origin::Static,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Raised when a rule cannot be expanded in bounded time.
pub enum ExpansionError {
    /// Advancing the date did not move it forward.
    NoProgress {
        description: String,
        at: NaiveDateTime,
    },
    /// The rule would emit more than [`MAX_OCCURRENCES`] before the cutoff.
    TooManyOccurrences { description: String, limit: usize },
}

impl fmt::Display for ExpansionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpansionError::NoProgress { description, at } => write!(
                f,
                "recurring rule `{description}` does not advance past {at}; its interval is too small"
            ),
            ExpansionError::TooManyOccurrences { description, limit } => write!(
                f,
                "recurring rule `{description}` exceeds {limit} occurrences before the horizon"
            ),
        }
    }
}

impl std::error::Error for ExpansionError {}

/// Expands `rule` into every occurrence on or before `min(horizon, rule.end)`.
///
/// The result depends only on the inputs, so repeated calls yield identical
/// sequences.
pub fn expand(
    rule: &RecurringRule,
    horizon: NaiveDateTime,
) -> Result<Vec<Occurrence>, ExpansionError> {
    let cutoff = match rule.end {
        Some(end) => end.min(horizon),
        None => horizon,
    };
    if rule.start > cutoff {
        return Ok(Vec::new());
    }
    check_capacity(rule, cutoff)?;

    let mut occurrences = Vec::new();
    let mut current = rule.start;

    while current <= cutoff {
        if occurrences.len() >= MAX_OCCURRENCES {
            return Err(ExpansionError::TooManyOccurrences {
                description: rule.description.clone(),
                limit: MAX_OCCURRENCES,
            });
        }
        occurrences.push(Occurrence {
            timestamp: current,
            description: rule.description.clone(),
            amount: rule.amount,
            origin: Origin::Recurring,
        });
        // Leaving the representable range means nothing further can precede the cutoff.
        let Some(next) = rule.interval.advance(current) else {
            break;
        };
        if next <= current {
            return Err(ExpansionError::NoProgress {
                description: rule.description.clone(),
                at: current,
            });
        }
        current = next;
    }

    Ok(occurrences)
}

/// Rejects rules whose first step implies more than [`MAX_OCCURRENCES`]
/// before `cutoff`, without materializing them.
fn check_capacity(rule: &RecurringRule, cutoff: NaiveDateTime) -> Result<(), ExpansionError> {
    let Some(next) = rule.interval.advance(rule.start) else {
        return Ok(());
    };
    let step = days_between(rule.start, next);
    if step <= 0.0 {
        return Err(ExpansionError::NoProgress {
            description: rule.description.clone(),
            at: rule.start,
        });
    }
    if days_between(rule.start, cutoff) / step >= MAX_OCCURRENCES as f64 {
        return Err(ExpansionError::TooManyOccurrences {
            description: rule.description.clone(),
            limit: MAX_OCCURRENCES,
        });
    }
    Ok(())
}

/// Occurrences at or before `now` (or the rule's end if earlier).
pub fn past_occurrences(
    rule: &RecurringRule,
    now: NaiveDateTime,
) -> Result<Vec<Occurrence>, ExpansionError> {
    expand(rule, now)
}

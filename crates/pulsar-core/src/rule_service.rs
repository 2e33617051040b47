//! Services related to recurring rule maintenance.

use chrono::NaiveDateTime;
use tracing::info;

use pulsar_domain::{past_occurrences, Ledger, RecurringRule, StaticTransaction};

use crate::CoreError;

/// Provides safe helpers for modifying the recurring rules of a ledger.
pub struct RuleService;

impl RuleService {
    /// Appends a rule after validating it, returning its index.
    pub fn add(ledger: &mut Ledger, rule: RecurringRule) -> Result<usize, CoreError> {
        rule.validate()?;
        ledger.rules.push(rule);
        Ok(ledger.rules.len() - 1)
    }

    /// Replaces the rule at `index` in place.
    pub fn update(ledger: &mut Ledger, index: usize, rule: RecurringRule) -> Result<(), CoreError> {
        rule.validate()?;
        let slot = ledger
            .rule_mut(index)
            .ok_or(CoreError::RuleNotFound(index))?;
        *slot = rule;
        Ok(())
    }

    /// Removes the rule at `index`, first copying every occurrence at or before
    /// `now` into the static transactions as archived entries. Returns how many
    /// occurrences were archived.
    pub fn remove(ledger: &mut Ledger, index: usize, now: NaiveDateTime) -> Result<usize, CoreError> {
        let rule = ledger.rule(index).ok_or(CoreError::RuleNotFound(index))?;
        let archived: Vec<StaticTransaction> = past_occurrences(rule, now)?
            .into_iter()
            .map(|occurrence| {
                StaticTransaction::archived(
                    occurrence.timestamp,
                    &occurrence.description,
                    occurrence.amount,
                )
            })
            .collect();
        let count = archived.len();
        let removed = ledger.rules.remove(index);
        ledger.transactions.extend(archived);
        info!(
            rule = %removed.description,
            archived = count,
            "recurring rule removed"
        );
        Ok(count)
    }
}

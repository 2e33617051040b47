//! The caller-owned data set the engine projects from.

use serde::{Deserialize, Serialize};

use crate::transaction::{RecurringRule, StaticTransaction};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
/// One-time transactions plus recurring rules, addressed by position.
pub struct Ledger {
    #[serde(default)]
    pub transactions: Vec<StaticTransaction>,
    #[serde(default)]
    pub rules: Vec<RecurringRule>,
}

impl Ledger {
    pub fn new(transactions: Vec<StaticTransaction>, rules: Vec<RecurringRule>) -> Self {
        Self {
            transactions,
            rules,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.rules.is_empty()
    }

    pub fn transaction(&self, index: usize) -> Option<&StaticTransaction> {
        self.transactions.get(index)
    }

    pub fn rule(&self, index: usize) -> Option<&RecurringRule> {
        self.rules.get(index)
    }

    pub fn rule_mut(&mut self, index: usize) -> Option<&mut RecurringRule> {
        self.rules.get_mut(index)
    }
}

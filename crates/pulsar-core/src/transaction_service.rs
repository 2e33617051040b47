//! Services for one-time transactions.

use pulsar_domain::{Ledger, StaticTransaction};

use crate::CoreError;

pub struct TransactionService;

impl TransactionService {
    /// Appends a transaction, returning its index.
    pub fn add(ledger: &mut Ledger, transaction: StaticTransaction) -> usize {
        ledger.transactions.push(transaction);
        ledger.transactions.len() - 1
    }

    pub fn remove(ledger: &mut Ledger, index: usize) -> Result<StaticTransaction, CoreError> {
        if index >= ledger.transactions.len() {
            return Err(CoreError::TransactionNotFound(index));
        }
        Ok(ledger.transactions.remove(index))
    }

    /// Drops every transaction and rule.
    pub fn reset(ledger: &mut Ledger) {
        ledger.transactions.clear();
        ledger.rules.clear();
    }
}

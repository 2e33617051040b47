use thiserror::Error;

use pulsar_domain::{ExpansionError, RuleError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Recurring rule #{0} not found")]
    RuleNotFound(usize),
    #[error("Transaction #{0} not found")]
    TransactionNotFound(usize),
    #[error("Invalid recurring rule: {0}")]
    InvalidRule(#[from] RuleError),
    #[error("Forecast configuration error: {0}")]
    Expansion(#[from] ExpansionError),
    #[error("Horizon of {0} years is out of range")]
    HorizonOutOfRange(f64),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
